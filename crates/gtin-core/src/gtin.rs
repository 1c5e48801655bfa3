//! # GTIN Codes
//!
//! Parsing, classification and validation of GTIN-8/12/13/14 numbers.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Gtin::check("7890142547852")                    │
//! │                                                                         │
//! │  1. "SEM GTIN"?            → sentinel, always valid, stop              │
//! │  2. empty?                 → InvalidInput                              │
//! │  3. non-digit?             → InvalidInput                              │
//! │  4. length ∉ {8,12,13,14}? → InvalidInput                              │
//! │  5. type    ← zero-run of "07890142547852" (padded to 14) → GTIN-13    │
//! │  6. prefix  ← padded[1..4] = "789"   (GTIN-8: padded[6..9])            │
//! │  7. region  ← PrefixTable::resolve("789") = "GS1 Brasil"               │
//! │  8. check digit ← mod-10, weights 3,1,3,1… from the right = 2          │
//! │                                                                         │
//! │  Result: immutable Gtin, every derived field computed once             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `validate()` re-derives its verdict from the stored fields every time it
//! is called; nothing is cached and nothing is mutated.
//!
//! ## Usage
//! ```rust
//! use gtin_core::Gtin;
//!
//! let gtin = Gtin::check("78935761").unwrap();
//! assert_eq!(gtin.prefix(), "789");
//! assert_eq!(gtin.region(), "GS1 Brasil");
//! assert_eq!(gtin.check_digit(), 1);
//! assert!(gtin.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreResult, GtinError, InputError};
use crate::lookup::{Credential, LookupResult, RemoteLookup, BRAZIL_PREFIXES};
use crate::prefix::PrefixTable;

/// NF-e marker for products that intentionally have no GTIN.
pub const NO_GTIN: &str = "SEM GTIN";

/// Width every code is left-padded to before classification.
const NORMALIZED_WIDTH: usize = 14;

// =============================================================================
// GTIN Type
// =============================================================================

/// GTIN family, derived from the zero-padded 14 digit form.
///
/// ## Classification
/// ```text
/// padded to 14          leading zeros     type
/// ──────────────        ─────────────     ───────
/// 00000078935761        6+                GTIN-8
/// 00036000291452        2..5              GTIN-12
/// 07890142547852        1                 GTIN-13
/// 17890142547859        0                 GTIN-14
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum GtinType {
    Gtin8,
    Gtin12,
    Gtin13,
    Gtin14,
    /// The "SEM GTIN" marker.
    NoGtin,
}

impl GtinType {
    /// Classifies a digit string. A pure function of its 14-digit padded form.
    pub fn classify(digits: &str) -> GtinType {
        let padded = normalize(digits);
        if padded.starts_with("000000") {
            GtinType::Gtin8
        } else if padded.starts_with("00") {
            GtinType::Gtin12
        } else if padded.starts_with('0') {
            GtinType::Gtin13
        } else {
            GtinType::Gtin14
        }
    }

    /// Nominal digit count (0 for [`GtinType::NoGtin`]).
    pub const fn digits(&self) -> u8 {
        match self {
            GtinType::Gtin8 => 8,
            GtinType::Gtin12 => 12,
            GtinType::Gtin13 => 13,
            GtinType::Gtin14 => 14,
            GtinType::NoGtin => 0,
        }
    }
}

impl std::fmt::Display for GtinType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GtinType::NoGtin => write!(f, "{}", NO_GTIN),
            other => write!(f, "GTIN-{}", other.digits()),
        }
    }
}

// =============================================================================
// Check Digit
// =============================================================================

/// Computes the GS1 modulus-10 check digit of `body` (the code without its
/// last digit).
///
/// The body is weighted 3,1,3,1… starting from its rightmost digit, which is
/// the same as left-padding it to 15 digits and weighting from position 0.
/// Non-digit bytes count as zero.
///
/// ## Example
/// ```rust
/// use gtin_core::gtin::compute_check_digit;
///
/// assert_eq!(compute_check_digit("7893576"), 1);
/// assert_eq!(compute_check_digit("789014254785"), 2);
/// ```
pub fn compute_check_digit(body: &str) -> u8 {
    let sum: u32 = body
        .bytes()
        .rev()
        .enumerate()
        .map(|(pos, byte)| {
            let digit = if byte.is_ascii_digit() {
                u32::from(byte - b'0')
            } else {
                0
            };
            let weight = if pos % 2 == 0 { 3 } else { 1 };
            digit * weight
        })
        .sum();

    ((10 - sum % 10) % 10) as u8
}

fn normalize(digits: &str) -> String {
    format!("{:0>width$}", digits, width = NORMALIZED_WIDTH)
}

/// 3-digit GS1 prefix: padded[6..9] for GTIN-8, padded[1..4] otherwise.
fn extract_prefix(digits: &str, gtin_type: GtinType) -> String {
    let padded = normalize(digits);
    let offset = match gtin_type {
        GtinType::Gtin8 => 6,
        _ => 1,
    };
    padded[offset..offset + 3].to_string()
}

// =============================================================================
// Gtin
// =============================================================================

/// A parsed and classified GTIN.
///
/// Built only through [`Gtin::check`] and friends, so an instance always has
/// every derived attribute filled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct Gtin {
    /// Raw digits as given (or "SEM GTIN").
    number: String,
    gtin_type: GtinType,
    prefix: String,
    region: String,
    check_digit: u8,
    prefix_known: bool,
    restricted: bool,
    sentinel: bool,
    #[serde(skip)]
    #[ts(skip)]
    credential: Option<Credential>,
}

impl Gtin {
    /// Parses `raw` against the bundled prefix table.
    pub fn check(raw: &str) -> CoreResult<Self> {
        Self::build(raw, PrefixTable::global(), None)
    }

    /// Parses `raw` and keeps `credential` for a later [`Gtin::lookup`].
    pub fn check_with_credential(raw: &str, credential: Credential) -> CoreResult<Self> {
        Self::build(raw, PrefixTable::global(), Some(credential))
    }

    /// Parses `raw` against a caller supplied prefix table.
    pub fn check_with_table(raw: &str, table: &PrefixTable) -> CoreResult<Self> {
        Self::build(raw, table, None)
    }

    /// Attaches a signing credential.
    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    fn build(raw: &str, table: &PrefixTable, credential: Option<Credential>) -> CoreResult<Self> {
        if raw == NO_GTIN {
            return Ok(Self::no_gtin(credential));
        }

        if raw.is_empty() {
            return Err(InputError::Empty.into());
        }

        if !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InputError::NonDigit {
                raw: raw.to_string(),
            }
            .into());
        }

        let length = raw.len();
        if !matches!(length, 8 | 12 | 13 | 14) {
            return Err(InputError::Length {
                raw: raw.to_string(),
                length,
            }
            .into());
        }

        let gtin_type = GtinType::classify(raw);
        let prefix = extract_prefix(raw, gtin_type);
        let resolution = table.resolve(&prefix);
        let region = resolution.region.to_string();
        let prefix_known = resolution.found;
        let restricted = table.is_restricted(&prefix);
        let check_digit = compute_check_digit(&raw[..length - 1]);

        Ok(Gtin {
            number: raw.to_string(),
            gtin_type,
            prefix,
            region,
            check_digit,
            prefix_known,
            restricted,
            sentinel: false,
            credential,
        })
    }

    fn no_gtin(credential: Option<Credential>) -> Self {
        Gtin {
            number: NO_GTIN.to_string(),
            gtin_type: GtinType::NoGtin,
            prefix: "000".to_string(),
            region: "GS1 Brasil".to_string(),
            check_digit: 0,
            prefix_known: true,
            restricted: false,
            sentinel: true,
            credential,
        }
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Authoritative validity check.
    ///
    /// ## Order
    /// 1. "SEM GTIN" → always valid
    /// 2. 14 digits starting with zero → `InvalidFormat`
    /// 3. prefix without a known region → `InvalidPrefix`
    /// 4. trailing digit ≠ computed check digit → `InvalidCheckDigit`
    pub fn validate(&self) -> CoreResult<()> {
        if self.sentinel {
            return Ok(());
        }

        // checked on the raw length: a padded 14-digit code that starts with 0
        // classifies as GTIN-13
        if self.number.len() == 14 && self.number.starts_with('0') {
            return Err(GtinError::InvalidFormat {
                code: self.number.clone(),
            });
        }

        if !self.prefix_known {
            return Err(GtinError::InvalidPrefix {
                prefix: self.prefix.clone(),
                region: self.region.clone(),
            });
        }

        let last = self
            .number
            .bytes()
            .last()
            .map(|b| b.wrapping_sub(b'0'));
        if last != Some(self.check_digit) {
            return Err(GtinError::InvalidCheckDigit {
                code: self.number.clone(),
                expected: self.check_digit,
            });
        }

        Ok(())
    }

    /// Shorthand for `validate().is_ok()`.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    // =========================================================================
    // Remote Lookup
    // =========================================================================

    /// Queries `remote` for product metadata.
    ///
    /// ## Preconditions (in order)
    /// ```text
    /// empty code           → MissingCode
    /// "SEM GTIN"           → InvalidSentinel
    /// no credential        → MissingCredential
    /// validate()           → propagated
    /// prefix ∉ {789, 790}  → UnsupportedRegion
    /// ```
    /// Only then is the remote service contacted. Its failures surface as
    /// `LookupFailed`.
    pub async fn lookup<R: RemoteLookup>(&self, remote: &R) -> CoreResult<LookupResult> {
        if self.number.is_empty() {
            return Err(GtinError::MissingCode);
        }

        if self.sentinel {
            return Err(GtinError::InvalidSentinel);
        }

        let credential = self
            .credential
            .as_ref()
            .ok_or(GtinError::MissingCredential)?;

        self.validate()?;

        if !self.is_brazilian() {
            return Err(GtinError::UnsupportedRegion {
                prefix: self.prefix.clone(),
                region: self.region.clone(),
            });
        }

        Ok(remote.consult(&self.number, credential).await?)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Raw digits (or "SEM GTIN").
    pub fn number(&self) -> &str {
        &self.number
    }

    /// GTIN family.
    pub fn gtin_type(&self) -> GtinType {
        self.gtin_type
    }

    /// 3-digit GS1 prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Region owning the prefix, or "Not Found".
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Computed check digit.
    pub fn check_digit(&self) -> u8 {
        self.check_digit
    }

    /// Whether any prefix range matched.
    pub fn is_prefix_known(&self) -> bool {
        self.prefix_known
    }

    /// Whether the prefix belongs to a restricted circulation range.
    pub fn is_restricted(&self) -> bool {
        self.restricted
    }

    /// Whether this is the "SEM GTIN" marker.
    pub fn is_sentinel(&self) -> bool {
        self.sentinel
    }

    /// Whether the prefix is one of the GS1 Brasil prefixes.
    pub fn is_brazilian(&self) -> bool {
        !self.sentinel && BRAZIL_PREFIXES.contains(&self.prefix.as_str())
    }

    /// Whether a signing credential is attached.
    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }
}

impl std::str::FromStr for Gtin {
    type Err = GtinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Gtin::check(s)
    }
}

impl std::fmt::Display for Gtin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.number)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
