//! # GS1 Prefix Table
//!
//! Maps a 3-digit GS1 prefix to the region (member organisation) that owns it.
//!
//! ## Lookup Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       PrefixTable::resolve("789")                       │
//! │                                                                         │
//! │   ranges (in dataset order)            contains 789?                    │
//! │   ─────────────────────────            ─────────────                    │
//! │   000..=019  GS1 US                    no                               │
//! │   020..=029  Restricted circulation    no                               │
//! │   ...                                                                   │
//! │   789..=790  GS1 Brasil                YES → stop, first match wins     │
//! │   800..=839  GS1 Italy                 (never inspected)                │
//! │                                                                         │
//! │   No range contains the prefix → region "Not Found", found = false     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The table is not required to be sorted or non-overlapping. Iteration
//! follows the dataset order and the first containing range wins.
//!
//! ## Loading
//! The bundled dataset (`data/prefixes.json`) is embedded at compile time
//! and parsed once, on first use, behind a `once_cell::sync::Lazy`. After
//! that the table is read-only and shared freely between threads.

use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::error::{CoreResult, GtinError};

/// Region reported when no range contains a prefix.
pub const NOT_FOUND: &str = "Not Found";

/// Bundled GS1 prefix dataset.
const BUNDLED_PREFIXES: &str = include_str!("../data/prefixes.json");

// bundled at compile time; `test_bundled_table_loads` guards the parse
static GLOBAL_TABLE: Lazy<PrefixTable> = Lazy::new(|| {
    PrefixTable::from_json(BUNDLED_PREFIXES).expect("bundled prefix dataset is valid")
});

// =============================================================================
// Prefix Range
// =============================================================================

/// One row of the reference dataset, as it appears on disk.
///
/// Bounds are decimal strings ("000", "019") and the restriction flag is
/// "0" or "1".
#[derive(Debug, Deserialize)]
struct PrefixRecord {
    start: String,
    end: String,
    restricted: String,
    region: String,
}

/// An inclusive range of GS1 prefixes owned by one region.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "PrefixRecord")]
pub struct PrefixRange {
    start: u32,
    end: u32,
    restricted: bool,
    region: String,
}

impl PrefixRange {
    /// Creates a range, rejecting `start > end`.
    pub fn new(start: u32, end: u32, restricted: bool, region: impl Into<String>) -> CoreResult<Self> {
        let region = region.into();
        if start > end {
            return Err(GtinError::InvalidPrefixTable(format!(
                "range {start}..={end} ({region}) has start greater than end"
            )));
        }
        Ok(PrefixRange {
            start,
            end,
            restricted,
            region,
        })
    }

    /// Returns true when the numeric value of `prefix` falls inside the range.
    ///
    /// Only ASCII digits count as a number, so signs, blanks and the empty
    /// string never match.
    pub fn contains(&self, prefix: &str) -> bool {
        if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
        match prefix.parse::<u32>() {
            Ok(value) => value >= self.start && value <= self.end,
            Err(_) => false,
        }
    }

    /// Lower bound (inclusive).
    #[inline]
    pub fn start(&self) -> u32 {
        self.start
    }

    /// Upper bound (inclusive).
    #[inline]
    pub fn end(&self) -> u32 {
        self.end
    }

    /// Whether numbers in this range have restricted circulation.
    #[inline]
    pub fn is_restricted(&self) -> bool {
        self.restricted
    }

    /// Name of the owning region.
    #[inline]
    pub fn region(&self) -> &str {
        &self.region
    }
}

impl TryFrom<PrefixRecord> for PrefixRange {
    type Error = GtinError;

    fn try_from(record: PrefixRecord) -> Result<Self, Self::Error> {
        let parse_bound = |value: &str| {
            value.trim().parse::<u32>().map_err(|_| {
                GtinError::InvalidPrefixTable(format!(
                    "bound '{}' of region '{}' is not a number",
                    value, record.region
                ))
            })
        };

        let start = parse_bound(&record.start)?;
        let end = parse_bound(&record.end)?;
        let restricted = match record.restricted.as_str() {
            "0" => false,
            "1" => true,
            other => {
                return Err(GtinError::InvalidPrefixTable(format!(
                    "restriction flag '{}' of region '{}' must be \"0\" or \"1\"",
                    other, record.region
                )))
            }
        };

        PrefixRange::new(start, end, restricted, record.region)
    }
}

// =============================================================================
// Prefix Table
// =============================================================================

/// Outcome of [`PrefixTable::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution<'a> {
    /// Owning region, or [`NOT_FOUND`].
    pub region: &'a str,
    /// True only when a range actually contains the prefix.
    pub found: bool,
}

/// Ordered collection of prefix ranges.
#[derive(Debug, Clone, Default)]
pub struct PrefixTable {
    ranges: Vec<PrefixRange>,
}

impl PrefixTable {
    /// The process-wide table built from the bundled dataset.
    pub fn global() -> &'static PrefixTable {
        &GLOBAL_TABLE
    }

    /// Builds a table that keeps `ranges` in the given order.
    pub fn from_ranges(ranges: Vec<PrefixRange>) -> Self {
        PrefixTable { ranges }
    }

    /// Parses a JSON array of `{start, end, restricted, region}` records.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let ranges: Vec<PrefixRange> =
            serde_json::from_str(json).map_err(|e| GtinError::InvalidPrefixTable(e.to_string()))?;
        Ok(PrefixTable { ranges })
    }

    /// First range, in table order, that contains `prefix`.
    pub fn find(&self, prefix: &str) -> Option<&PrefixRange> {
        self.ranges.iter().find(|range| range.contains(prefix))
    }

    /// Resolves the region owning `prefix`.
    pub fn resolve(&self, prefix: &str) -> Resolution<'_> {
        match self.find(prefix) {
            Some(range) => Resolution {
                region: range.region(),
                found: true,
            },
            None => Resolution {
                region: NOT_FOUND,
                found: false,
            },
        }
    }

    /// Restriction flag of the matching range; false when nothing matches.
    pub fn is_restricted(&self, prefix: &str) -> bool {
        self.find(prefix).is_some_and(PrefixRange::is_restricted)
    }

    /// Number of ranges.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Returns true if the table has no ranges.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Iterates ranges in table order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &PrefixRange> {
        self.ranges.iter()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn restricted_range() -> PrefixRange {
        PrefixRange::new(20, 29, true, "Restricted circulation numbers within the region").unwrap()
    }

    #[test]
    fn test_bundled_table_loads() {
        let table = PrefixTable::global();
        assert!(!table.is_empty());
        assert!(table.iter().all(|r| r.start() <= r.end()));
    }

    #[test]
    fn test_range_restriction_flag() {
        let range = PrefixRange::new(0, 19, false, "GS1 US").unwrap();
        assert!(!range.is_restricted());
        assert!(restricted_range().is_restricted());
        assert_eq!(
            restricted_range().region(),
            "Restricted circulation numbers within the region"
        );
    }

    #[test]
    fn test_range_contains() {
        let range = restricted_range();
        assert!(!range.contains("999"));
        assert!(!range.contains("030"));
        assert!(range.contains("020"));
        assert!(range.contains("021"));
        assert!(range.contains("029"));
        assert!(!range.contains("02a"));
        assert!(!range.contains(""));
    }

    #[test]
    fn test_signed_prefix_never_matches() {
        let range = restricted_range();
        assert!(!range.contains("+20"));
        assert!(!range.contains(" 20"));

        let resolution = PrefixTable::global().resolve("+20");
        assert!(!resolution.found);
        assert_eq!(resolution.region, NOT_FOUND);
        assert!(!PrefixTable::global().is_restricted("+20"));
    }

    #[test]
    fn test_range_rejects_inverted_bounds() {
        assert!(matches!(
            PrefixRange::new(30, 20, false, "Backwards"),
            Err(GtinError::InvalidPrefixTable(_))
        ));
    }

    #[test]
    fn test_resolve_known_prefixes() {
        let table = PrefixTable::global();
        assert_eq!(
            table.resolve("789"),
            Resolution {
                region: "GS1 Brasil",
                found: true
            }
        );
        assert_eq!(table.resolve("790").region, "GS1 Brasil");
        assert_eq!(table.resolve("779").region, "GS1 Argentina");
        assert_eq!(table.resolve("003").region, "GS1 US");
    }

    #[test]
    fn test_resolve_unknown_prefix() {
        let resolution = PrefixTable::global().resolve("510");
        assert_eq!(resolution.region, NOT_FOUND);
        assert!(!resolution.found);
    }

    #[test]
    fn test_empty_table_finds_nothing() {
        let table = PrefixTable::default();
        let resolution = table.resolve("789");
        assert!(!resolution.found);
        assert_eq!(resolution.region, NOT_FOUND);
        assert!(!table.is_restricted("789"));
    }

    #[test]
    fn test_first_match_wins() {
        let table = PrefixTable::from_ranges(vec![
            PrefixRange::new(780, 799, false, "Wide").unwrap(),
            PrefixRange::new(789, 790, true, "Narrow").unwrap(),
        ]);
        assert_eq!(table.resolve("789").region, "Wide");
        assert!(!table.is_restricted("789"));

        let reversed = PrefixTable::from_ranges(table.iter().rev().cloned().collect());
        assert_eq!(reversed.resolve("789").region, "Narrow");
        assert!(reversed.is_restricted("789"));
        assert_eq!(reversed.resolve("781").region, "Wide");
    }

    #[test]
    fn test_is_restricted_on_bundled_table() {
        let table = PrefixTable::global();
        assert!(table.is_restricted("025"));
        assert!(table.is_restricted("978"));
        assert!(!table.is_restricted("789"));
        assert!(!table.is_restricted("510"));
    }

    #[test]
    fn test_from_json() {
        let json = r#"[
            {"start": "000", "end": "019", "restricted": "0", "region": "GS1 US"},
            {"start": "020", "end": "029", "restricted": "1", "region": "Restricted"}
        ]"#;
        let table = PrefixTable::from_json(json).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.is_restricted("021"));
        assert_eq!(table.resolve("007").region, "GS1 US");
    }

    #[test]
    fn test_from_json_rejects_bad_records() {
        let bad_flag = r#"[{"start": "000", "end": "019", "restricted": "yes", "region": "GS1 US"}]"#;
        assert!(PrefixTable::from_json(bad_flag).is_err());

        let bad_bound = r#"[{"start": "abc", "end": "019", "restricted": "0", "region": "GS1 US"}]"#;
        assert!(PrefixTable::from_json(bad_bound).is_err());

        let inverted = r#"[{"start": "050", "end": "019", "restricted": "0", "region": "GS1 US"}]"#;
        assert!(PrefixTable::from_json(inverted).is_err());
    }
}
