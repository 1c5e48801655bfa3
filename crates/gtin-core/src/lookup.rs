//! # Remote Lookup Contract
//!
//! The types shared between the pure core and the CCG/SEFAZ client.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Remote Lookup Boundary                           │
//! │                                                                         │
//! │   gtin-core                              gtin-ccg                       │
//! │   ─────────                              ────────                       │
//! │   Gtin::lookup(&remote)                                                 │
//! │     ├── preconditions (code, SEM GTIN,                                  │
//! │     │   credential, is_valid, 789/790)                                  │
//! │     │                                                                   │
//! │     └── remote.consult(gtin, credential) ──► CcgClient                  │
//! │                                               SOAP 1.2 + mTLS           │
//! │         Ok(LookupResult)  ◄────────────────── cStat mapping             │
//! │         Err(LookupFailure) ◄───────────────── CcgError (opaque)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The core never inspects transport internals: any collaborator failure
//! arrives as a [`LookupFailure`] carrying a kind, a numeric code and text.

use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

/// The two GS1 Brasil prefixes eligible for the CCG lookup.
pub const BRAZIL_PREFIXES: [&str; 2] = ["789", "790"];

/// Remote status: product data found.
pub const STATUS_FOUND: &str = "9490";

/// Remote status: product found, data not available.
pub const STATUS_UNAVAILABLE: &str = "9496";

// =============================================================================
// Credential
// =============================================================================

/// Digital certificate used for client authentication.
///
/// Holds a PKCS#12 (PFX) bundle and its password. The core treats it as
/// opaque data; reading it from disk and turning it into a TLS identity is
/// the client's job.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pkcs12_der: Vec<u8>,
    password: String,
}

impl Credential {
    /// Wraps a DER encoded PKCS#12 bundle.
    pub fn from_pkcs12(pkcs12_der: impl Into<Vec<u8>>, password: impl Into<String>) -> Self {
        Credential {
            pkcs12_der: pkcs12_der.into(),
            password: password.into(),
        }
    }

    /// Raw PKCS#12 bytes.
    pub fn pkcs12_der(&self) -> &[u8] {
        &self.pkcs12_der
    }

    /// Bundle password.
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("pkcs12_der", &format_args!("<{} bytes>", self.pkcs12_der.len()))
            .field("password", &"<redacted>")
            .finish()
    }
}

// =============================================================================
// Lookup Result
// =============================================================================

/// Product metadata returned by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LookupResult {
    /// Whether the remote service accepted the query.
    pub success: bool,

    /// Human readable outcome (remote error text on failure).
    pub reason: String,

    /// Status code reported by the remote service (`cStat`).
    pub status_code: String,

    /// Product description (`xProd`).
    pub product_description: Option<String>,

    /// Mercosur nomenclature code (`NCM`).
    pub ncm_code: Option<String>,

    /// Tax substitution code (`CEST`).
    pub cest_code: Option<String>,
}

impl LookupResult {
    /// Reason attached to [`STATUS_FOUND`] results.
    pub const REASON_FOUND: &'static str = "Data found.";

    /// Reason attached to [`STATUS_UNAVAILABLE`] results.
    pub const REASON_UNAVAILABLE: &'static str = "found but unavailable";

    /// Product found with its data.
    pub fn found(
        product_description: Option<String>,
        ncm_code: Option<String>,
        cest_code: Option<String>,
    ) -> Self {
        LookupResult {
            success: true,
            reason: Self::REASON_FOUND.to_string(),
            status_code: STATUS_FOUND.to_string(),
            product_description,
            ncm_code,
            cest_code,
        }
    }

    /// Product found but the service withholds its data.
    pub fn unavailable() -> Self {
        LookupResult {
            success: true,
            reason: Self::REASON_UNAVAILABLE.to_string(),
            status_code: STATUS_UNAVAILABLE.to_string(),
            product_description: None,
            ncm_code: None,
            cest_code: None,
        }
    }

    /// Query rejected by the service.
    pub fn rejected(status_code: impl Into<String>, reason: impl Into<String>) -> Self {
        LookupResult {
            success: false,
            reason: reason.into(),
            status_code: status_code.into(),
            product_description: None,
            ncm_code: None,
            cest_code: None,
        }
    }
}

// =============================================================================
// Lookup Failure
// =============================================================================

/// Broad category of a collaborator failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Connection refused, DNS failure, timeout.
    Connection,
    /// Handshake or client certificate problem.
    Tls,
    /// Non-200 HTTP status.
    Http,
    /// SOAP fault declared by the remote service.
    Fault,
    /// Response body could not be understood.
    Response,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Connection => write!(f, "connection"),
            FailureKind::Tls => write!(f, "tls"),
            FailureKind::Http => write!(f, "http"),
            FailureKind::Fault => write!(f, "fault"),
            FailureKind::Response => write!(f, "response"),
        }
    }
}

/// Opaque error surfaced by a [`RemoteLookup`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} error {code}: {message}")]
pub struct LookupFailure {
    /// Failure category.
    pub kind: FailureKind,
    /// Numeric code from the collaborator (curl-style or remapped HTTP code).
    pub code: u32,
    /// Description.
    pub message: String,
}

impl LookupFailure {
    /// Creates a failure.
    pub fn new(kind: FailureKind, code: u32, message: impl Into<String>) -> Self {
        LookupFailure {
            kind,
            code,
            message: message.into(),
        }
    }
}

// =============================================================================
// Remote Lookup Trait
// =============================================================================

/// A service able to resolve product metadata for a validated GTIN.
///
/// Implementations may block on the network; timeouts and cancellation
/// belong to the implementation.
pub trait RemoteLookup {
    /// Queries the remote service for `gtin`, authenticating with `credential`.
    fn consult(
        &self,
        gtin: &str,
        credential: &Credential,
    ) -> impl Future<Output = Result<LookupResult, LookupFailure>> + Send;
}

// =============================================================================
// Unit Tests
// =============================================================================
