/// Credential model persisted by the store
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the user registered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthType {
    #[serde(rename = "License Key")]
    LicenseKey,
    #[serde(rename = "Username/Password")]
    UsernamePassword,
}

impl AuthType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthType::LicenseKey => "License Key",
            AuthType::UsernamePassword => "Username/Password",
        }
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A license key or a username/password pair, never both.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "authType")]
pub enum Credential {
    #[serde(rename = "License Key")]
    LicenseKey {
        #[serde(rename = "licenseKey")]
        license_key: String,
    },
    #[serde(rename = "Username/Password")]
    UsernamePassword { username: String, password: String },
}

impl Credential {
    /// License key credential, surrounding whitespace removed
    pub fn license_key(key: impl AsRef<str>) -> Self {
        Credential::LicenseKey {
            license_key: key.as_ref().trim().to_string(),
        }
    }

    /// Username/password credential. The username is trimmed, the password kept as typed.
    pub fn username_password(username: impl AsRef<str>, password: impl Into<String>) -> Self {
        Credential::UsernamePassword {
            username: username.as_ref().trim().to_string(),
            password: password.into(),
        }
    }

    pub fn auth_type(&self) -> AuthType {
        match self {
            Credential::LicenseKey { .. } => AuthType::LicenseKey,
            Credential::UsernamePassword { .. } => AuthType::UsernamePassword,
        }
    }

    /// Reject blank fields
    pub fn validate(&self) -> Result<(), &'static str> {
        match self {
            Credential::LicenseKey { license_key } if license_key.trim().is_empty() => {
                Err("Please enter a valid license key.")
            }
            Credential::UsernamePassword { username, password }
                if username.trim().is_empty() || password.trim().is_empty() =>
            {
                Err("Please enter both username and password.")
            }
            _ => Ok(()),
        }
    }
}

// Secrets stay out of logs
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::LicenseKey { .. } => f
                .debug_struct("LicenseKey")
                .field("license_key", &"<redacted>")
                .finish(),
            Credential::UsernamePassword { username, .. } => f
                .debug_struct("UsernamePassword")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

/// On-disk record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCredential {
    pub credential: Credential,
    pub registered_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_trim() {
        assert_eq!(
            Credential::license_key("  KEY-123 \n"),
            Credential::LicenseKey { license_key: "KEY-123".to_string() }
        );

        let cred = Credential::username_password(" alice ", " pw ");
        assert_eq!(
            cred,
            Credential::UsernamePassword {
                username: "alice".to_string(),
                password: " pw ".to_string(),
            }
        );
    }

    #[test]
    fn test_validate_rejects_blank() {
        assert!(Credential::license_key("   ").validate().is_err());
        assert!(Credential::username_password("alice", "").validate().is_err());
        assert!(Credential::username_password("", "secret").validate().is_err());
        assert!(Credential::license_key("KEY").validate().is_ok());
        assert!(Credential::username_password("alice", "secret").validate().is_ok());
    }

    #[test]
    fn test_serialization_is_tagged() {
        let json = serde_json::to_string(&Credential::license_key("KEY-1")).unwrap();
        assert_eq!(json, r#"{"authType":"License Key","licenseKey":"KEY-1"}"#);

        let json = serde_json::to_string(&Credential::username_password("bob", "pw")).unwrap();
        assert_eq!(
            json,
            r#"{"authType":"Username/Password","username":"bob","password":"pw"}"#
        );
    }

    #[test]
    fn test_untagged_record_rejected() {
        let result: Result<Credential, _> = serde_json::from_str(r#"{"licenseKey":"KEY"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let shown = format!("{:?}", Credential::username_password("bob", "hunter2"));
        assert!(shown.contains("bob"));
        assert!(!shown.contains("hunter2"));

        let shown = format!("{:?}", Credential::license_key("KEY-SECRET"));
        assert!(!shown.contains("KEY-SECRET"));
    }

    #[test]
    fn test_auth_type_display() {
        assert_eq!(AuthType::LicenseKey.to_string(), "License Key");
        assert_eq!(
            Credential::username_password("a", "b").auth_type(),
            AuthType::UsernamePassword
        );
    }
}
