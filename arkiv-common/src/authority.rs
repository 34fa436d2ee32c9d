//! Authority-control confidence vocabulary
//!
//! Mirrors the confidence grades used by external authority sources. The
//! numeric codes are what gets persisted in `metadata_values.confidence`;
//! the lowercase tokens are what clients send and receive.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Certainty grade for an authority association, ordered from "nothing
/// declared" to "accepted by the authority".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    /// No confidence declared
    Unset,
    /// Authority key present but no value was ever determined
    #[serde(rename = "novalue")]
    NoValue,
    /// Rejected by the authority
    Rejected,
    /// Lookup against the authority failed
    Failed,
    /// Authority has no match
    #[serde(rename = "notfound")]
    NotFound,
    /// Several equally plausible matches
    Ambiguous,
    /// Single match of uncertain quality
    Uncertain,
    /// Accepted as an authority match
    Accepted,
}

impl ConfidenceLevel {
    /// Every level in ascending order
    pub const ALL: [ConfidenceLevel; 8] = [
        ConfidenceLevel::Unset,
        ConfidenceLevel::NoValue,
        ConfidenceLevel::Rejected,
        ConfidenceLevel::Failed,
        ConfidenceLevel::NotFound,
        ConfidenceLevel::Ambiguous,
        ConfidenceLevel::Uncertain,
        ConfidenceLevel::Accepted,
    ];

    /// Persisted numeric code
    pub fn code(self) -> i64 {
        match self {
            ConfidenceLevel::Unset => -1,
            ConfidenceLevel::NoValue => 0,
            ConfidenceLevel::Rejected => 100,
            ConfidenceLevel::Failed => 200,
            ConfidenceLevel::NotFound => 300,
            ConfidenceLevel::Ambiguous => 400,
            ConfidenceLevel::Uncertain => 500,
            ConfidenceLevel::Accepted => 600,
        }
    }

    /// Level for a persisted code, `None` for codes outside the vocabulary
    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.code() == code)
    }

    /// Client-facing token
    pub fn as_str(self) -> &'static str {
        match self {
            ConfidenceLevel::Unset => "unset",
            ConfidenceLevel::NoValue => "novalue",
            ConfidenceLevel::Rejected => "rejected",
            ConfidenceLevel::Failed => "failed",
            ConfidenceLevel::NotFound => "notfound",
            ConfidenceLevel::Ambiguous => "ambiguous",
            ConfidenceLevel::Uncertain => "uncertain",
            ConfidenceLevel::Accepted => "accepted",
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token did not name a known confidence level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownConfidence(pub String);

impl fmt::Display for UnknownConfidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown confidence level: {:?}", self.0)
    }
}

impl std::error::Error for UnknownConfidence {}

impl FromStr for ConfidenceLevel {
    type Err = UnknownConfidence;

    /// Case-insensitive token match
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownConfidence(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_ordered_by_code() {
        for pair in ConfidenceLevel::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].code() < pair[1].code());
        }
    }

    #[test]
    fn code_roundtrip() {
        for level in ConfidenceLevel::ALL {
            assert_eq!(ConfidenceLevel::from_code(level.code()), Some(level));
        }
    }

    #[test]
    fn unknown_code_is_not_a_level() {
        assert_eq!(ConfidenceLevel::from_code(12345), None);
        assert_eq!(ConfidenceLevel::from_code(-2), None);
    }

    #[test]
    fn tokens_parse_case_insensitively() {
        assert_eq!("accepted".parse::<ConfidenceLevel>(), Ok(ConfidenceLevel::Accepted));
        assert_eq!("NoValue".parse::<ConfidenceLevel>(), Ok(ConfidenceLevel::NoValue));
        assert!("certain".parse::<ConfidenceLevel>().is_err());
    }

    #[test]
    fn serializes_as_token() {
        let json = serde_json::to_string(&ConfidenceLevel::NotFound).unwrap();
        assert_eq!(json, "\"notfound\"");
    }
}
