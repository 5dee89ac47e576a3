//! RedefineAuth client library
//!
//! Registers and logs in end users of a desktop application against a
//! hosted RedefineAuth deployment:
//! 1. Machine fingerprinting (HWID)
//! 2. JSON requests with retry and exponential backoff
//! 3. HTTP status to result mapping with stable message prefixes
//! 4. Local credential persistence (obfuscated, not encrypted)
//!
//! ```no_run
//! use redefine_auth::{AuthClient, ClientConfig, Credential};
//!
//! let config = ClientConfig::new("https://auth.example.com", "dev_123").with_app_version("1.2.0");
//! let mut client = AuthClient::new(config)?;
//!
//! let result = if client.is_registered() {
//!     client.login(None, None)
//! } else {
//!     client.register(&Credential::license_key("XXXX-XXXX"), None)
//! };
//! if !result.success && result.validation.is_version_rejected() {
//!     eprintln!("Please update: {}", result.message);
//! }
//!
//! redefine_auth::shutdown_shared_transport();
//! # Ok::<(), redefine_auth::ConfigError>(())
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod session;
pub mod storage;
pub mod utils;
pub mod verification;

pub use client::{AuthClient, AuthResult, endpoints};
pub use config::{ClientConfig, load_adjacent_config, load_config};
pub use error::{ConfigError, TransportError};
pub use session::SessionState;
pub use storage::{AuthType, Credential, CredentialCipher, CredentialStore, StoredCredential, XorCipher};
pub use verification::{
    CancelToken, FingerprintSource, FixedFingerprint, HostFingerprint, HttpResponse,
    ReqwestTransport, ResultStatus, RetryPolicy, Sleeper, ThreadSleeper, Transport,
    ValidationResult, get_machine_fingerprint, shared_transport, shutdown_shared_transport,
};
