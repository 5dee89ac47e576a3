/// Utilities shared across modules
use std::env::consts::{ARCH, OS};

/// Target OS and architecture, e.g. `linux-x86_64`
pub fn platform_segment() -> String {
    format!("{OS}-{ARCH}")
}

/// Name of the user running this process, if the environment exposes one.
pub fn current_username() -> Option<String> {
    ["USER", "USERNAME", "LOGNAME"]
        .iter()
        .filter_map(|key| std::env::var(key).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

/// Hostname of this machine, if readable.
pub fn current_hostname() -> Option<String> {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
}
