//! Reversible transforms applied to the stored credential record.
//!
//! [`XorCipher`] is obfuscation, not encryption: the key is derived from the
//! hostname and user name, both guessable, and the stream repeats. It keeps
//! credentials from being readable at a glance and nothing more. Hosts that
//! need real protection plug an authenticated cipher in through
//! [`CredentialCipher`].

use crate::utils::{current_hostname, current_username};

/// Used when neither hostname nor user name is readable
const FALLBACK_KEY: &str = "RedefineAuth";

pub trait CredentialCipher: Send + Sync {
    fn encrypt(&self, plaintext: &[u8]) -> Vec<u8>;

    /// `None` when the data cannot be deciphered
    fn decrypt(&self, ciphertext: &[u8]) -> Option<Vec<u8>>;
}

/// Same-length repeating-key XOR
#[derive(Clone)]
pub struct XorCipher {
    key: Vec<u8>,
}

impl XorCipher {
    /// An empty key is replaced by a fixed fallback.
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        let key = key.into();
        if key.is_empty() {
            return Self {
                key: FALLBACK_KEY.as_bytes().to_vec(),
            };
        }
        Self { key }
    }

    /// Key = hostname + user name
    pub fn for_current_user() -> Self {
        let key = format!(
            "{}{}",
            current_hostname().unwrap_or_default(),
            current_username().unwrap_or_default()
        );
        Self::new(key.into_bytes())
    }

    fn apply(&self, data: &[u8]) -> Vec<u8> {
        data.iter()
            .zip(self.key.iter().cycle())
            .map(|(byte, key)| byte ^ key)
            .collect()
    }
}

impl CredentialCipher for XorCipher {
    fn encrypt(&self, plaintext: &[u8]) -> Vec<u8> {
        self.apply(plaintext)
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Option<Vec<u8>> {
        Some(self.apply(ciphertext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xor_reverses() {
        let cipher = XorCipher::new("host-user");
        let plain = br#"{"authType":"License Key","licenseKey":"ABC"}"#;
        let sealed = cipher.encrypt(plain);

        assert_eq!(sealed.len(), plain.len());
        assert_ne!(sealed.as_slice(), plain.as_slice());
        assert_eq!(cipher.decrypt(&sealed).unwrap(), plain.to_vec());
    }

    #[test]
    fn test_different_keys_differ() {
        let plain = b"same input";
        assert_ne!(
            XorCipher::new("key-a").encrypt(plain),
            XorCipher::new("key-b").encrypt(plain)
        );
    }

    #[test]
    fn test_empty_key_uses_fallback() {
        let cipher = XorCipher::new(Vec::new());
        let sealed = cipher.encrypt(b"data");
        assert_eq!(sealed, XorCipher::new(FALLBACK_KEY).encrypt(b"data"));
    }
}
