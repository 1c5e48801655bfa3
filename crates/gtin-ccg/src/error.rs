//! # CCG Error Types
//!
//! Error types for the remote lookup client.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       CCG Error Categories                              │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Certificate   │  │     Transport           │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │ CertificateLoad │  │  ConnectionFailed       │ │
//! │  │  InvalidUrl     │  │ Certificate     │  │  Timeout                │ │
//! │  │  ConfigLoad     │  │ Tls             │  │  Http (non-200)         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │    Protocol:  SoapFault · InvalidResponse                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  Every variant collapses into gtin_core::LookupFailure                 │
//! │  { kind, code, message } when crossing into the core.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Numeric codes follow the curl error numbers the service integrations
//! have always reported (7 = could not connect, 28 = timeout, 35 = TLS
//! handshake, 58 = client certificate problem), plus the remapped HTTP codes
//! from [`crate::http_codes`].

use std::error::Error as _;
use std::time::Duration;

use gtin_core::{FailureKind, LookupFailure};
use thiserror::Error;

use crate::http_codes;

/// Could not connect.
pub const CODE_CONNECT: u32 = 7;
/// Operation timed out.
pub const CODE_TIMEOUT: u32 = 28;
/// TLS handshake failure.
pub const CODE_TLS: u32 = 35;
/// Failure receiving network data.
pub const CODE_RECEIVE: u32 = 56;
/// Problem with the local client certificate.
pub const CODE_CERTIFICATE: u32 = 58;
/// Malformed URL.
pub const CODE_URL: u32 = 3;

/// Result type alias for CCG operations.
pub type CcgResult<T> = Result<T, CcgError>;

/// Everything that can go wrong while talking to CCG.
#[derive(Debug, Error)]
pub enum CcgError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid client configuration.
    #[error("Invalid CCG configuration: {0}")]
    InvalidConfig(String),

    /// Endpoint is not a usable URL.
    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(String),

    /// Failed to read or parse the config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    // =========================================================================
    // Certificate Errors
    // =========================================================================
    /// PFX file could not be read.
    #[error("Failed to read certificate file {path}: {reason}")]
    CertificateLoad { path: String, reason: String },

    /// PFX bundle rejected (bad password, corrupt data).
    #[error("Invalid client certificate: {0}")]
    Certificate(String),

    /// TLS client could not be built.
    #[error("TLS error {code}: {message}")]
    Tls { code: u32, message: String },

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// Connection could not be established or broke mid-way.
    #[error("Connection failed ({code}): {message}")]
    ConnectionFailed { code: u32, message: String },

    /// No answer within the limit carried here (connect or whole request).
    #[error("Connection timeout after {0:?}")]
    Timeout(Duration),

    /// The service answered with something other than 200.
    ///
    /// `code` is the remapped error number (0 → 52, 500 → 89).
    #[error("HTTP {status}: {description}")]
    Http {
        status: u16,
        code: u32,
        description: String,
    },

    // =========================================================================
    // Protocol Errors
    // =========================================================================
    /// The service declared a SOAP fault.
    #[error("SOAP fault [{code}]: {reason}")]
    SoapFault { code: String, reason: String },

    /// The response body is not a retConsGTIN document.
    #[error("Invalid CCG response: {0}")]
    InvalidResponse(String),
}

impl CcgError {
    /// Builds an [`CcgError::Http`] from a status, using the reference table.
    pub fn http(status: u16) -> Self {
        CcgError::Http {
            status,
            code: http_codes::error_code(status),
            description: http_codes::describe(status).to_string(),
        }
    }

    /// Classifies a reqwest failure.
    ///
    /// `connect_timeout` and `request_timeout` are the two limits the client
    /// was built with; the one that expired is reported.
    pub fn from_transport(
        err: reqwest::Error,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> Self {
        if err.is_timeout() {
            let limit = if err.is_connect() {
                connect_timeout
            } else {
                request_timeout
            };
            return CcgError::Timeout(limit);
        }

        if is_tls_failure(&err) {
            return CcgError::Tls {
                code: CODE_TLS,
                message: error_chain(&err),
            };
        }

        let code = if err.is_connect() {
            CODE_CONNECT
        } else if err.is_builder() {
            CODE_URL
        } else if err.is_body() || err.is_decode() {
            CODE_RECEIVE
        } else {
            CODE_CONNECT
        };

        CcgError::ConnectionFailed {
            code,
            message: error_chain(&err),
        }
    }

    /// Returns true if the same request may succeed when retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CcgError::ConnectionFailed { .. } | CcgError::Timeout(_)
        ) || matches!(self, CcgError::Http { status, .. } if *status >= 500)
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            CcgError::InvalidConfig(_) | CcgError::InvalidUrl(_) | CcgError::ConfigLoadFailed(_)
        )
    }
}

/// True when the TLS backend sits anywhere in the source chain.
fn is_tls_failure(err: &reqwest::Error) -> bool {
    let mut source = err.source();
    while let Some(cause) = source {
        if cause.is::<native_tls::Error>() {
            return true;
        }
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            if io.get_ref().is_some_and(|inner| inner.is::<native_tls::Error>()) {
                return true;
            }
        }
        source = cause.source();
    }
    false
}

/// The error text followed by its causes, the url appears once.
fn error_chain(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<url::ParseError> for CcgError {
    fn from(err: url::ParseError) -> Self {
        CcgError::InvalidUrl(err.to_string())
    }
}

impl From<toml::de::Error> for CcgError {
    fn from(err: toml::de::Error) -> Self {
        CcgError::ConfigLoadFailed(err.to_string())
    }
}

impl From<quick_xml::Error> for CcgError {
    fn from(err: quick_xml::Error) -> Self {
        CcgError::InvalidResponse(err.to_string())
    }
}

impl From<CcgError> for LookupFailure {
    fn from(err: CcgError) -> Self {
        let message = err.to_string();
        match err {
            CcgError::ConnectionFailed { code, .. } => {
                LookupFailure::new(FailureKind::Connection, code, message)
            }
            CcgError::Timeout(_) => LookupFailure::new(FailureKind::Connection, CODE_TIMEOUT, message),
            CcgError::Tls { code, .. } => LookupFailure::new(FailureKind::Tls, code, message),
            CcgError::Certificate(_) | CcgError::CertificateLoad { .. } => {
                LookupFailure::new(FailureKind::Tls, CODE_CERTIFICATE, message)
            }
            CcgError::Http { code, .. } => LookupFailure::new(FailureKind::Http, code, message),
            CcgError::SoapFault { ref code, .. } => {
                LookupFailure::new(FailureKind::Fault, code.parse().unwrap_or(0), message)
            }
            CcgError::InvalidResponse(_) => LookupFailure::new(FailureKind::Response, 0, message),
            CcgError::InvalidUrl(_) => LookupFailure::new(FailureKind::Connection, CODE_URL, message),
            CcgError::InvalidConfig(_) | CcgError::ConfigLoadFailed(_) => {
                LookupFailure::new(FailureKind::Connection, 0, message)
            }
        }
    }
}
