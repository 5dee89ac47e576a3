/// Storage module - Credential model and obfuscated local persistence
pub mod cipher;
pub mod credentials;
pub mod store;

pub use cipher::{CredentialCipher, XorCipher};
pub use credentials::{AuthType, Credential, StoredCredential};
pub use store::{CredentialStore, CREDENTIALS_FILE_NAME};
