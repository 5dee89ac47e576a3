/// Configuration loader
use super::schema::ClientConfig;
use crate::error::ConfigError;
use std::fs;
use std::path::{Path, PathBuf};

/// Load and validate configuration from a JSON file
pub fn load_config(path: &Path) -> Result<ClientConfig, ConfigError> {
    let config_content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let config: ClientConfig =
        serde_json::from_str(&config_content).map_err(ConfigError::Parse)?;

    config.validate()?;

    Ok(config)
}

/// Load configuration from the file next to the host executable
/// Named: <executable>.config (e.g., "myapp.config")
pub fn load_adjacent_config() -> Result<ClientConfig, ConfigError> {
    let exe_path = std::env::current_exe().map_err(ConfigError::ExePath)?;
    load_config(&adjacent_config_path(&exe_path))
}

fn adjacent_config_path(exe_path: &Path) -> PathBuf {
    PathBuf::from(format!("{}.config", exe_path.display()))
}
