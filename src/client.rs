//! RedefineAuth API client.
//!
//! Register and login calls are blocking from the caller's view. Every
//! transport fault is folded into a [`ValidationResult`]; nothing here
//! returns an error or panics on network failure.

use serde::Serialize;
use std::sync::Arc;

use crate::config::ClientConfig;
use crate::error::ConfigError;
use crate::session::SessionState;
use crate::storage::{AuthType, Credential, CredentialStore};
use crate::verification::{
    CancelToken, FingerprintSource, HostFingerprint, ReqwestTransport, ResultStatus, RetryPolicy,
    Sleeper, ThreadSleeper, Transport, ValidationResult, network, shared_transport,
};

/// Fixed paths of the external service
pub mod endpoints {
    /// License key registration
    pub const KEY_VALIDATE: &str = "/api/keys/validate";
    /// Username/password registration
    pub const APP_CREDENTIALS_VALIDATE: &str = "/api/app-credentials/validate";
    /// Login, for either kind of credential
    pub const CLIENT_USER_LOGIN: &str = "/api/client-users/login";
    pub const HEALTH: &str = "/api/health";
}

const NOT_REGISTERED_MESSAGE: &str = "No stored credentials found. Please register first.";

/// Fields every request carries
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestContext<'a> {
    redefine_developer_id: &'a str,
    app_version: &'a str,
    hwid: &'a str,
}

#[derive(Serialize)]
struct Envelope<'a, P: Serialize> {
    #[serde(flatten)]
    context: RequestContext<'a>,
    #[serde(flatten)]
    payload: &'a P,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LicenseKeyPayload<'a> {
    product_key: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LicenseLoginPayload<'a> {
    license_key: &'a str,
}

#[derive(Serialize)]
struct UserCredentialsPayload<'a> {
    username: &'a str,
    password: &'a str,
}

/// Outcome of [`AuthClient::register`] and [`AuthClient::login`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthResult {
    pub success: bool,
    pub message: String,
    /// `None` only when no credential was available at all
    pub auth_type: Option<AuthType>,
    pub validation: ValidationResult,
}

impl AuthResult {
    fn from_validation(validation: ValidationResult, auth_type: Option<AuthType>) -> Self {
        Self {
            success: validation.success,
            message: validation.message.clone(),
            auth_type,
            validation,
        }
    }

    fn local_failure(status: ResultStatus, message: &str, auth_type: Option<AuthType>) -> Self {
        Self::from_validation(ValidationResult::failure(status, message), auth_type)
    }

    pub fn status(&self) -> ResultStatus {
        self.validation.status
    }
}

/// Client for one developer account
pub struct AuthClient {
    config: ClientConfig,
    base_url: String,
    transport: Arc<dyn Transport>,
    fingerprint: Box<dyn FingerprintSource>,
    sleeper: Box<dyn Sleeper>,
    retry: RetryPolicy,
    store: CredentialStore,
    session: SessionState,
}

impl AuthClient {
    /// Client over HTTP. Uses the process-wide transport unless the config
    /// asks for a non-default timeout.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let transport: Arc<dyn Transport> = if config.timeout() == network::DEFAULT_TIMEOUT {
            shared_transport()?
        } else {
            Arc::new(ReqwestTransport::new(config.timeout())?)
        };

        Self::with_transport(config, transport)
    }

    /// Client over a caller-supplied transport
    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let store = match &config.credentials_path {
            Some(path) => CredentialStore::new(path.clone()),
            None => CredentialStore::for_app(&config.app_dir_name),
        };

        Ok(Self {
            base_url: config.api_base_url(),
            retry: RetryPolicy::new(config.max_attempts, config.base_delay()),
            config,
            transport,
            fingerprint: Box::new(HostFingerprint),
            sleeper: Box::new(ThreadSleeper),
            store,
            session: SessionState::new(),
        })
    }

    pub fn with_store(mut self, store: CredentialStore) -> Self {
        self.store = store;
        self
    }

    pub fn with_fingerprint(mut self, source: impl FingerprintSource + 'static) -> Self {
        self.fingerprint = Box::new(source);
        self
    }

    pub fn with_sleeper(mut self, sleeper: impl Sleeper + 'static) -> Self {
        self.sleeper = Box::new(sleeper);
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Registered this run, or a credential is stored from an earlier one
    pub fn is_registered(&self) -> bool {
        self.session.is_registered || self.store.exists()
    }

    pub fn stored_credential(&self) -> Option<Credential> {
        self.store.load()
    }

    /// Validate `credential` with the server; on success remember it both
    /// in the session and on disk.
    pub fn register(&mut self, credential: &Credential, app_version: Option<&str>) -> AuthResult {
        let auth_type = credential.auth_type();
        if let Err(message) = credential.validate() {
            return AuthResult::local_failure(ResultStatus::ValidationError, message, Some(auth_type));
        }

        let validation = match credential {
            Credential::LicenseKey { license_key } => self.send(
                endpoints::KEY_VALIDATE,
                &LicenseKeyPayload {
                    product_key: license_key,
                },
                app_version,
                None,
            ),
            Credential::UsernamePassword { username, password } => self.send(
                endpoints::APP_CREDENTIALS_VALIDATE,
                &UserCredentialsPayload { username, password },
                app_version,
                None,
            ),
        };

        if validation.success {
            log::info!("Registered with {}", auth_type);
            self.session.mark_registered(validation.clone(), auth_type);
            self.store.save(credential);
        } else {
            log::info!("Registration with {} failed: {}", auth_type, validation.status);
        }

        AuthResult::from_validation(validation, Some(auth_type))
    }

    /// Log in with `credential`, or with the stored one when `None`.
    pub fn login(&mut self, credential: Option<&Credential>, app_version: Option<&str>) -> AuthResult {
        let stored;
        let credential = match credential {
            Some(credential) => credential,
            None => match self.store.load() {
                Some(found) => {
                    stored = found;
                    &stored
                }
                None => {
                    return AuthResult::local_failure(
                        ResultStatus::NotRegistered,
                        NOT_REGISTERED_MESSAGE,
                        None,
                    );
                }
            },
        };

        let auth_type = credential.auth_type();
        if let Err(message) = credential.validate() {
            return AuthResult::local_failure(ResultStatus::ValidationError, message, Some(auth_type));
        }

        let validation = match credential {
            Credential::LicenseKey { license_key } => self.send(
                endpoints::CLIENT_USER_LOGIN,
                &LicenseLoginPayload { license_key },
                app_version,
                None,
            ),
            Credential::UsernamePassword { username, password } => self.send(
                endpoints::CLIENT_USER_LOGIN,
                &UserCredentialsPayload { username, password },
                app_version,
                None,
            ),
        };

        if validation.success {
            log::info!("Logged in with {}", auth_type);
            self.session.mark_registered(validation.clone(), auth_type);
        } else {
            log::info!("Login with {} failed: {}", auth_type, validation.status);
        }

        AuthResult::from_validation(validation, Some(auth_type))
    }

    /// POST `payload` plus the common fields to `{base_url}{endpoint}`
    pub fn validate<P: Serialize>(&self, endpoint: &str, payload: &P) -> ValidationResult {
        self.send(endpoint, payload, None, None)
    }

    /// [`Self::validate`], giving up between attempts once `cancel` fires
    pub fn validate_with_cancel<P: Serialize>(
        &self,
        endpoint: &str,
        payload: &P,
        cancel: Option<&CancelToken>,
    ) -> ValidationResult {
        self.send(endpoint, payload, None, cancel)
    }

    /// Whether the health endpoint answers with 2xx
    pub fn test_connection(&self) -> bool {
        let url = format!("{}{}", self.base_url, endpoints::HEALTH);
        match self.transport.get(&url) {
            Ok(response) => response.is_success(),
            Err(e) => {
                log::warn!("Connection test failed: {}", e);
                false
            }
        }
    }

    /// Forget this run's registration. The stored credential is kept.
    pub fn reset_session(&mut self) {
        self.session.reset();
    }

    /// Reset the session and optionally delete the stored credential
    pub fn logout(&mut self, clear_stored: bool) {
        if clear_stored {
            self.store.clear();
        }
        self.session.reset();
    }

    fn send<P: Serialize>(
        &self,
        endpoint: &str,
        payload: &P,
        app_version: Option<&str>,
        cancel: Option<&CancelToken>,
    ) -> ValidationResult {
        let hwid = self.fingerprint.compute_id();
        let envelope = Envelope {
            context: RequestContext {
                redefine_developer_id: &self.config.developer_id,
                app_version: app_version.unwrap_or(&self.config.app_version),
                hwid: &hwid,
            },
            payload,
        };

        let body = match serde_json::to_string(&envelope) {
            Ok(body) => body,
            Err(e) => {
                return ValidationResult::failure(
                    ResultStatus::ValidationError,
                    format!("Request payload must serialize to a JSON object: {e}"),
                );
            }
        };

        let url = format!("{}{}", self.base_url, endpoint);
        self.post_with_retry(&url, &body, cancel)
    }

    /// 5xx, connection failures and timeouts are retried with exponential
    /// backoff, everything else is final.
    fn post_with_retry(&self, url: &str, body: &str, cancel: Option<&CancelToken>) -> ValidationResult {
        let mut attempt = 0;

        loop {
            if cancel.is_some_and(CancelToken::is_cancelled) {
                return ValidationResult::failure(ResultStatus::Cancelled, "Request cancelled")
                    .with_attempts(attempt);
            }

            attempt += 1;
            log::debug!("POST {} (attempt {}/{})", url, attempt, self.retry.max_attempts);

            let (result, retryable) = match self.transport.post_json(url, body) {
                Ok(response) => {
                    if !response.is_success() {
                        log::warn!(
                            "RedefineAuth API error (attempt {}): HTTP {} - {}",
                            attempt,
                            response.status,
                            response.body
                        );
                    }
                    (ValidationResult::from_http(&response), response.status >= 500)
                }
                Err(e) => {
                    log::warn!("Request to {} failed (attempt {}): {}", url, attempt, e);
                    (ValidationResult::from_transport_error(&e), e.is_retryable())
                }
            };

            if !retryable {
                return result.with_attempts(attempt);
            }

            if !self.retry.has_attempts_left(attempt) {
                if attempt > 1 {
                    return result.into_exhausted(attempt);
                }
                return result.with_attempts(attempt);
            }

            let delay = self.retry.delay_after(attempt);
            log::warn!(
                "Retrying in {}ms (attempt {}/{})",
                delay.as_millis(),
                attempt + 1,
                self.retry.max_attempts
            );
            self.sleeper.sleep(delay);
        }
    }
}
