//! # Error Types
//!
//! Domain-specific error types for gtin-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  gtin-core errors (this file)                                          │
//! │  ├── GtinError   - Validation and lookup precondition failures         │
//! │  └── InputError  - Raw input rejected at construction time             │
//! │                                                                         │
//! │  gtin-ccg errors (separate crate)                                      │
//! │  └── CcgError    - Transport / SOAP failures                           │
//! │                    (reaches the core as an opaque LookupFailure)       │
//! │                                                                         │
//! │  Flow: InputError → GtinError ← LookupFailure ← CcgError               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (raw code, prefix, region)
//! 3. Errors are enum variants, never String
//! 4. Every failure is returned at the point of detection, nothing is auto-corrected

use thiserror::Error;

use crate::lookup::LookupFailure;

// =============================================================================
// GTIN Error
// =============================================================================

/// Errors raised while building, validating or looking up a GTIN.
#[derive(Debug, Error)]
pub enum GtinError {
    /// Raw input is absent, non-numeric or has an unsupported length.
    #[error("Invalid GTIN input: {0}")]
    InvalidInput(#[from] InputError),

    /// A 14 digit GTIN starts with zero.
    #[error("A GTIN-14 cannot start with zero [{code}]")]
    InvalidFormat { code: String },

    /// The prefix is not covered by any known GS1 range.
    ///
    /// ## User Workflow
    /// ```text
    /// Gtin::check("5109907267612")
    ///      │
    ///      ▼
    /// prefix = "510" → PrefixTable has no range for 510
    ///      │
    ///      ▼
    /// InvalidPrefix { prefix: "510", region: "Not Found" }
    /// ```
    #[error("GTIN prefix {prefix} is invalid [{region}]")]
    InvalidPrefix { prefix: String, region: String },

    /// The trailing digit does not match the computed check digit.
    #[error("GTIN [{code}] has an invalid check digit (expected {expected})")]
    InvalidCheckDigit { code: String, expected: u8 },

    // -------------------------------------------------------------------------
    // Remote lookup preconditions
    // -------------------------------------------------------------------------
    /// There is no code to look up.
    #[error("A GTIN number is required for the remote lookup")]
    MissingCode,

    /// The "SEM GTIN" marker cannot be looked up.
    #[error("'SEM GTIN' is not eligible for the remote lookup")]
    InvalidSentinel,

    /// No signing certificate was supplied.
    #[error("A digital certificate is required for the remote lookup")]
    MissingCredential,

    /// Only Brazilian prefixes can be queried on CCG.
    #[error("Only Brazilian prefixes [789 and 790] can be looked up, prefix {prefix} is [{region}]")]
    UnsupportedRegion { prefix: String, region: String },

    /// The remote collaborator failed.
    #[error("Remote lookup failed: {0}")]
    LookupFailed(#[from] LookupFailure),

    /// A custom prefix dataset could not be loaded.
    #[error("Invalid prefix table: {0}")]
    InvalidPrefixTable(String),
}

// =============================================================================
// Input Error
// =============================================================================

/// Rejections of the raw string handed to `Gtin::check`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// Nothing was passed.
    #[error("a GTIN number must be provided")]
    Empty,

    /// The input contains something other than ASCII digits.
    #[error("a GTIN contains only digits, [{raw}] is not accepted")]
    NonDigit { raw: String },

    /// The input is not 8, 12, 13 or 14 digits long.
    #[error("only GTIN 8, 12, 13 or 14 are accepted, [{raw}] has {length} digits")]
    Length { raw: String, length: usize },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with GtinError.
pub type CoreResult<T> = Result<T, GtinError>;

// =============================================================================
// Unit Tests
// =============================================================================
