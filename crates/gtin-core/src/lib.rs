//! # gtin-core: Pure GTIN Validation
//!
//! This crate is the **heart** of the GTIN toolkit. It validates and
//! classifies GTIN-8/12/13/14 numbers as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        GTIN Toolkit Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/gtin-cli                                │   │
//! │  │        gtin check <code>   ·   gtin consult <code> --pfx …     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ gtin-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   gtin    │  │  prefix   │  │  lookup   │  │   error   │  │   │
//! │  │   │   Gtin    │  │PrefixTable│  │RemoteLook.│  │ GtinError │  │   │
//! │  │   │ GtinType  │  │PrefixRange│  │LookupRes. │  │InputError │  │   │
//! │  │   └───────────┘  └───────────┘  └─────┬─────┘  └───────────┘  │   │
//! │  │                                       │                         │   │
//! │  │   NO I/O • NO NETWORK • PURE FUNCTIONS│                         │   │
//! │  └───────────────────────────────────────┼─────────────────────────┘   │
//! │                                          │ implemented by               │
//! │  ┌───────────────────────────────────────▼─────────────────────────┐   │
//! │  │                    gtin-ccg (CCG/SEFAZ client)                  │   │
//! │  │              SOAP 1.2 envelope, mTLS, response mapping          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`gtin`] - The `Gtin` value type, type classification, check digit
//! - [`prefix`] - GS1 prefix ranges and the bundled reference table
//! - [`lookup`] - Contract with the remote lookup collaborator
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use gtin_core::{Gtin, GtinError, GtinType};
//!
//! let gtin = Gtin::check("7890142547852").unwrap();
//! assert_eq!(gtin.gtin_type(), GtinType::Gtin13);
//! assert_eq!(gtin.region(), "GS1 Brasil");
//! assert!(gtin.validate().is_ok());
//!
//! // Wrong check digit
//! let err = Gtin::check("7890142547851").unwrap().validate().unwrap_err();
//! assert!(matches!(err, GtinError::InvalidCheckDigit { .. }));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod gtin;
pub mod lookup;
pub mod prefix;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreResult, GtinError, InputError};
pub use gtin::{compute_check_digit, Gtin, GtinType, NO_GTIN};
pub use lookup::{
    Credential, FailureKind, LookupFailure, LookupResult, RemoteLookup, BRAZIL_PREFIXES,
};
pub use prefix::{PrefixRange, PrefixTable, Resolution, NOT_FOUND};
