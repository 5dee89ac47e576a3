/// Local credential persistence
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use super::cipher::{CredentialCipher, XorCipher};
use super::credentials::{Credential, StoredCredential};
use crate::error::StoreError;

/// File name inside the application data directory
pub const CREDENTIALS_FILE_NAME: &str = "credentials.dat";

/// Single-record credential file.
///
/// Every failure is logged and treated as "nothing stored": losing the
/// cache must never block a manual re-registration.
pub struct CredentialStore {
    path: Option<PathBuf>,
    cipher: Box<dyn CredentialCipher>,
}

impl CredentialStore {
    /// Store at an explicit path, obfuscated with [`XorCipher::for_current_user`]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_cipher(path, Box::new(XorCipher::for_current_user()))
    }

    pub fn with_cipher(path: impl Into<PathBuf>, cipher: Box<dyn CredentialCipher>) -> Self {
        Self {
            path: Some(path.into()),
            cipher,
        }
    }

    /// `<user data dir>/<app_dir_name>/credentials.dat`
    pub fn for_app(app_dir_name: &str) -> Self {
        let path = dirs::data_dir().map(|dir| dir.join(app_dir_name).join(CREDENTIALS_FILE_NAME));
        if path.is_none() {
            log::warn!("No user data directory found, credentials will not be persisted");
        }
        Self {
            path,
            cipher: Box::new(XorCipher::for_current_user()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn exists(&self) -> bool {
        self.path.as_deref().is_some_and(Path::is_file)
    }

    /// Persist `credential`, replacing any previous record
    pub fn save(&self, credential: &Credential) {
        match self.try_save(credential) {
            Ok(path) => log::debug!("Saved {} credentials to {}", credential.auth_type(), path.display()),
            Err(e) => log::warn!("Failed to save credentials: {}", e),
        }
    }

    pub fn load(&self) -> Option<Credential> {
        self.load_record().map(|record| record.credential)
    }

    /// Stored record including its registration time
    pub fn load_record(&self) -> Option<StoredCredential> {
        match self.try_load() {
            Ok(record) => record,
            Err(e) => {
                log::warn!("Failed to load credentials: {}", e);
                None
            }
        }
    }

    /// Delete the record. Absent file is not an error.
    pub fn clear(&self) {
        if let Err(e) = self.try_clear() {
            log::warn!("Failed to clear credentials: {}", e);
        }
    }

    fn require_path(&self) -> Result<&Path, StoreError> {
        self.path.as_deref().ok_or(StoreError::NoDataDir)
    }

    fn try_save(&self, credential: &Credential) -> Result<&Path, StoreError> {
        credential.validate().map_err(StoreError::InvalidCredential)?;
        let path = self.require_path()?;

        let record = StoredCredential {
            credential: credential.clone(),
            registered_at: Utc::now(),
        };
        let json = serde_json::to_vec(&record)?;
        let encoded = STANDARD.encode(self.cipher.encrypt(&json));

        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent).map_err(|source| StoreError::Io {
            path: parent.to_path_buf(),
            source,
        })?;

        // Write next to the target then rename over it
        let mut staged = NamedTempFile::new_in(parent).map_err(|source| StoreError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
        staged
            .write_all(encoded.as_bytes())
            .and_then(|_| staged.as_file().sync_all())
            .map_err(|source| StoreError::Io {
                path: staged.path().to_path_buf(),
                source,
            })?;
        staged.persist(path).map_err(|e| StoreError::Persist {
            path: path.to_path_buf(),
            source: e.error,
        })?;

        Ok(path)
    }

    fn try_load(&self) -> Result<Option<StoredCredential>, StoreError> {
        let path = self.require_path()?;

        let encoded = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let sealed = STANDARD.decode(encoded.trim())?;
        let json = self.cipher.decrypt(&sealed).ok_or(StoreError::Cipher)?;
        let record: StoredCredential = serde_json::from_slice(&json)?;
        record
            .credential
            .validate()
            .map_err(StoreError::InvalidCredential)?;

        Ok(Some(record))
    }

    fn try_clear(&self) -> Result<(), StoreError> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };

        match fs::remove_file(path) {
            Ok(()) => {
                log::debug!("Cleared stored credentials at {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}
