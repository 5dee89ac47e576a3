/// In-memory authentication state for the current process
use chrono::{DateTime, Utc};

use crate::storage::AuthType;
use crate::verification::ValidationResult;

/// Registration bookkeeping for this run. No I/O.
///
/// Owned by [`crate::AuthClient`] and mutated through `&mut` only, so there
/// is a single writer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub is_registered: bool,
    pub last_result: Option<ValidationResult>,
    pub auth_type: Option<AuthType>,
    pub last_login_time: Option<DateTime<Utc>>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_registered(&mut self, result: ValidationResult, auth_type: AuthType) {
        self.is_registered = true;
        self.last_result = Some(result);
        self.auth_type = Some(auth_type);
        self.last_login_time = Some(Utc::now());
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
