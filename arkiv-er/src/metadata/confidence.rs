//! Authority confidence resolution for incoming values

use arkiv_common::{ConfidenceLevel, Error, Result};

/// Read-only lookup from client tokens to confidence levels
pub trait ConfidenceVocabulary: Send + Sync {
    fn lookup(&self, token: &str) -> Option<ConfidenceLevel>;
}

/// Vocabulary of the standard authority confidence grades
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardVocabulary;

impl ConfidenceVocabulary for StandardVocabulary {
    fn lookup(&self, token: &str) -> Option<ConfidenceLevel> {
        token.parse().ok()
    }
}

/// Authority key and confidence to persist alongside a value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorityAssignment {
    pub authority: Option<String>,
    pub confidence: ConfidenceLevel,
}

/// Derive the confidence for an optional (authority, confidence) pair
///
/// An explicit token wins. Without one the level stays `Unset`, except that
/// a value carrying an authority key is promoted to `NoValue`. Empty strings
/// count as absent.
pub fn resolve_confidence(
    authority: Option<&str>,
    confidence: Option<&str>,
    vocabulary: &dyn ConfidenceVocabulary,
) -> Result<AuthorityAssignment> {
    let authority = authority.filter(|a| !a.is_empty());

    let mut level = match confidence.filter(|c| !c.is_empty()) {
        Some(token) => vocabulary
            .lookup(token)
            .ok_or_else(|| Error::InvalidInput(format!("unknown confidence level: {:?}", token)))?,
        None => ConfidenceLevel::Unset,
    };

    if authority.is_some() && level == ConfidenceLevel::Unset {
        level = ConfidenceLevel::NoValue;
    }

    Ok(AuthorityAssignment {
        authority: authority.map(str::to_string),
        confidence: level,
    })
}
