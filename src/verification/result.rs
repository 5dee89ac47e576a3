//! Validation results and HTTP-to-result mapping.
//!
//! The message prefixes produced here (`"Application Paused: "`,
//! `"Access Denied: "`, ...) are part of the public contract: host
//! applications match on them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::network::HttpResponse;
use crate::error::TransportError;

pub const PAUSED_PREFIX: &str = "Application Paused: ";
pub const INVALID_REQUEST_PREFIX: &str = "Invalid Request: ";
pub const NOT_FOUND_PREFIX: &str = "Resource/User Not Found: ";
pub const ACCESS_DENIED_PREFIX: &str = "Access Denied: ";

const DEFAULT_SUCCESS_MESSAGE: &str = "Validation successful";
const DEFAULT_REJECTED_MESSAGE: &str = "Validation failed";
const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

/// Outcome tag of a validation call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultStatus {
    /// 2xx and the server agreed
    Success,
    /// 2xx but the body said `success: false`
    Rejected,
    /// 503
    ApplicationPaused,
    /// 400
    InvalidRequest,
    /// 404
    NotFound,
    /// 403
    AccessDenied,
    /// Any other non-2xx below 500
    HttpError,
    /// 5xx other than 503
    ServerError,
    NetworkError,
    #[serde(rename = "timeout_error")]
    Timeout,
    /// Malformed server response
    #[serde(rename = "response_parse_error")]
    ParseError,
    /// Local input rejected before any request
    ValidationError,
    /// Login without supplied or stored credentials
    NotRegistered,
    /// Every attempt failed with a retryable error
    RetriesExhausted,
    Cancelled,
}

impl ResultStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultStatus::Success => "success",
            ResultStatus::Rejected => "rejected",
            ResultStatus::ApplicationPaused => "application_paused",
            ResultStatus::InvalidRequest => "invalid_request",
            ResultStatus::NotFound => "not_found",
            ResultStatus::AccessDenied => "access_denied",
            ResultStatus::HttpError => "http_error",
            ResultStatus::ServerError => "server_error",
            ResultStatus::NetworkError => "network_error",
            ResultStatus::Timeout => "timeout_error",
            ResultStatus::ParseError => "response_parse_error",
            ResultStatus::ValidationError => "validation_error",
            ResultStatus::NotRegistered => "not_registered",
            ResultStatus::RetriesExhausted => "retries_exhausted",
            ResultStatus::Cancelled => "cancelled",
        }
    }

    /// 4xx outcomes, including a paused application
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ResultStatus::ApplicationPaused
                | ResultStatus::InvalidRequest
                | ResultStatus::NotFound
                | ResultStatus::AccessDenied
                | ResultStatus::HttpError
        )
    }
}

impl fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Nested user record returned by the client-users endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerUser {
    pub username: Option<String>,
    pub registered_at: Option<DateTime<Utc>>,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Response body schema shared by every validation endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerResponse {
    pub success: Option<bool>,
    pub message: Option<String>,
    pub status: Option<String>,
    pub username: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub user: Option<ServerUser>,
}

impl ServerResponse {
    fn parse(body: &str) -> Result<Self, String> {
        let parsed: ServerResponse = serde_json::from_str(body).map_err(|e| e.to_string())?;
        if parsed.success.is_none() && parsed.message.is_none() {
            return Err("response has neither `success` nor `message`".to_string());
        }
        Ok(parsed)
    }

    fn owner_username(&self) -> Option<String> {
        self.username
            .clone()
            .or_else(|| self.user.as_ref().and_then(|u| u.username.clone()))
    }
}

/// Fully populated result of one validation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub success: bool,
    pub message: String,
    pub status: ResultStatus,
    /// Raw `status` string reported by the server, if any
    pub server_status: Option<String>,
    pub owner_username: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub registered_at: Option<DateTime<Utc>>,
    pub last_login_at: Option<DateTime<Utc>>,
    /// Requests issued to produce this result (0 for local failures)
    pub attempts: u32,
}

impl ValidationResult {
    /// Client-side failure with no server data
    pub fn failure(status: ResultStatus, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            status,
            server_status: None,
            owner_username: None,
            expires_at: None,
            registered_at: None,
            last_login_at: None,
            attempts: 0,
        }
    }

    /// Map a completed HTTP exchange
    pub fn from_http(response: &HttpResponse) -> Self {
        if response.is_success() {
            return Self::from_success_body(&response.body);
        }

        let lenient = serde_json::from_str::<ServerResponse>(response.body.trim()).ok();
        let detail = lenient
            .as_ref()
            .and_then(|body| body.message.clone())
            .filter(|m| !m.trim().is_empty())
            .or_else(|| Some(response.body.trim().to_string()))
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_string());

        let (status, message) = match response.status {
            503 => (ResultStatus::ApplicationPaused, format!("{PAUSED_PREFIX}{detail}")),
            400 => (ResultStatus::InvalidRequest, format!("{INVALID_REQUEST_PREFIX}{detail}")),
            404 => (ResultStatus::NotFound, format!("{NOT_FOUND_PREFIX}{detail}")),
            403 => (ResultStatus::AccessDenied, format!("{ACCESS_DENIED_PREFIX}{detail}")),
            code if code >= 500 => (ResultStatus::ServerError, format!("HTTP {code}: {detail}")),
            code => (ResultStatus::HttpError, format!("HTTP {code}: {detail}")),
        };

        let mut result = Self::failure(status, message);
        if let Some(body) = lenient {
            result.server_status = body.status;
        }
        result
    }

    fn from_success_body(body: &str) -> Self {
        let body = body.trim();
        if body.is_empty() {
            let mut result = Self::failure(ResultStatus::Success, DEFAULT_SUCCESS_MESSAGE);
            result.success = true;
            return result;
        }

        let parsed = match ServerResponse::parse(body) {
            Ok(parsed) => parsed,
            Err(e) => {
                log::warn!("Unparseable success response: {}", e);
                return Self::failure(
                    ResultStatus::ParseError,
                    format!("Failed to parse successful server response: {e}"),
                );
            }
        };

        let success = parsed.success.unwrap_or(true);
        let message = parsed
            .message
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| {
                let fallback = if success { DEFAULT_SUCCESS_MESSAGE } else { DEFAULT_REJECTED_MESSAGE };
                fallback.to_string()
            });

        Self {
            success,
            message,
            status: if success { ResultStatus::Success } else { ResultStatus::Rejected },
            owner_username: parsed.owner_username(),
            server_status: parsed.status,
            expires_at: parsed.expires_at,
            registered_at: parsed.user.as_ref().and_then(|u| u.registered_at),
            last_login_at: parsed.user.as_ref().and_then(|u| u.last_login_at),
            attempts: 0,
        }
    }

    /// Map a transport failure
    pub fn from_transport_error(error: &TransportError) -> Self {
        match error {
            TransportError::Timeout(detail) => Self::failure(
                ResultStatus::Timeout,
                format!("Request timeout: Server took too long to respond ({detail})"),
            ),
            TransportError::Connect(detail) => Self::failure(
                ResultStatus::NetworkError,
                format!("Network error: Unable to connect to server ({detail})"),
            ),
            TransportError::Request(detail) => {
                Self::failure(ResultStatus::NetworkError, format!("Network error: {detail}"))
            }
        }
    }

    pub(crate) fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    /// Retag a final retryable failure. The category prefix stays at the
    /// front of the message.
    pub(crate) fn into_exhausted(mut self, attempts: u32) -> Self {
        self.message = format!("{} (after {} attempts)", self.message, attempts);
        self.status = ResultStatus::RetriesExhausted;
        self.attempts = attempts;
        self
    }

    /// Server refused this app version ("Access Denied" mentioning "version").
    pub fn is_version_rejected(&self) -> bool {
        self.message.starts_with(ACCESS_DENIED_PREFIX)
            && self.message.to_ascii_lowercase().contains("version")
    }

    pub fn is_paused(&self) -> bool {
        self.message.starts_with(PAUSED_PREFIX)
    }
}
