/// Machine fingerprinting (HWID) for license binding
use sha2::{Digest, Sha256};

use crate::utils::{current_hostname, platform_segment};

/// Placeholder for an attribute that could not be read
const MISSING_SEGMENT: &str = "N/A";

/// Returned when no host-specific attribute is readable at all
pub const FINGERPRINT_SENTINEL: &str = "HWID_GENERATION_ERROR";

/// Source of the `hwid` value sent with every request.
pub trait FingerprintSource: Send + Sync {
    fn compute_id(&self) -> String;
}

/// Fingerprint derived from the current host
#[derive(Debug, Default, Clone, Copy)]
pub struct HostFingerprint;

impl FingerprintSource for HostFingerprint {
    fn compute_id(&self) -> String {
        get_machine_fingerprint()
    }
}

/// Caller-provided identifier, sent verbatim
#[derive(Debug, Clone)]
pub struct FixedFingerprint(pub String);

impl FingerprintSource for FixedFingerprint {
    fn compute_id(&self) -> String {
        self.0.clone()
    }
}

/// Generate machine fingerprint
///
/// Combines:
/// - Hostname
/// - Machine ID (Linux)
/// - MAC address of first network interface (Linux)
/// - Platform name
///
/// # Returns
/// Upper-case hex SHA256 of the combined identifiers, or
/// [`FINGERPRINT_SENTINEL`] when none of the host attributes can be read
pub fn get_machine_fingerprint() -> String {
    let hostname = current_hostname();
    let machine_id = get_machine_id();
    let mac = get_mac_address();

    if hostname.is_none() && machine_id.is_none() && mac.is_none() {
        log::warn!("No host attributes readable, using fallback HWID");
        return FINGERPRINT_SENTINEL.to_string();
    }

    let data = format!(
        "HOST:{}_MACHINE:{}_MAC:{}_PLATFORM:{}",
        hostname.as_deref().unwrap_or(MISSING_SEGMENT),
        machine_id.as_deref().unwrap_or(MISSING_SEGMENT),
        mac.as_deref().unwrap_or(MISSING_SEGMENT),
        platform_segment(),
    );

    let mut hasher = Sha256::new();
    hasher.update(data.as_bytes());
    hex::encode_upper(hasher.finalize())
}

/// Read the OS machine identifier
fn get_machine_id() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        for path in ["/etc/machine-id", "/var/lib/dbus/machine-id"] {
            if let Ok(id) = std::fs::read_to_string(path) {
                let id = id.trim();
                if !id.is_empty() {
                    return Some(id.to_string());
                }
            }
        }
    }

    None
}

/// Get MAC address of first network interface
///
/// Interfaces are visited in name order so the choice is stable
fn get_mac_address() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        if let Ok(entries) = std::fs::read_dir("/sys/class/net") {
            let mut names: Vec<String> = entries
                .flatten()
                .map(|entry| entry.file_name().to_string_lossy().into_owned())
                .filter(|name| name != "lo")
                .collect();
            names.sort();

            for iface in names {
                let addr_path = format!("/sys/class/net/{}/address", iface);
                if let Ok(addr) = std::fs::read_to_string(&addr_path) {
                    let addr = addr.trim();
                    if !addr.is_empty() && addr != "00:00:00:00:00:00" {
                        return Some(addr.to_string());
                    }
                }
            }
        }
    }

    None
}
