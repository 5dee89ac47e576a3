/// Build script to load environment variables from .env file
/// This allows compile-time injection of the API base URL

fn main() {
    // .env is looked up in the crate root
    if let Ok(path) = std::env::var("CARGO_MANIFEST_DIR") {
        let env_path = std::path::Path::new(&path).join(".env");
        if env_path.exists() {
            println!("cargo:rerun-if-changed={}", env_path.display());

            // Read .env file manually (avoid extra dependencies in build script)
            if let Ok(contents) = std::fs::read_to_string(&env_path) {
                for line in contents.lines() {
                    let line = line.trim();

                    if line.is_empty() || line.starts_with('#') {
                        continue;
                    }

                    if let Some((key, value)) = line.split_once('=') {
                        let key = key.trim();
                        let value = value.trim().trim_matches('"').trim_matches('\'');

                        if key == "REDEFINE_API_BASE_URL" {
                            println!("cargo:rustc-env={}={}", key, value);
                            println!("cargo:warning=Building with API base URL: {}", value);
                        }
                    }
                }
            }
        }
    }
}
