//! Qualified metadata field names

use arkiv_common::db::qualified_name;
use arkiv_common::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// `schema.element[.qualifier]`, split into its parts
///
/// Segments are kept verbatim; registry matching is exact-string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedFieldName {
    pub schema: String,
    pub element: String,
    pub qualifier: Option<String>,
}

impl QualifiedFieldName {
    pub fn new(schema: &str, element: &str, qualifier: Option<&str>) -> Self {
        Self {
            schema: schema.to_string(),
            element: element.to_string(),
            qualifier: qualifier.map(str::to_string),
        }
    }

    /// Parse a dotted name
    ///
    /// Two segments give an unqualified name, three a qualified one.
    /// Anything else, or an empty segment, is `InvalidInput`.
    pub fn parse(name: &str) -> Result<Self> {
        let segments: Vec<&str> = name.split('.').collect();
        // A trailing dot (`dc.title.`) is an empty qualifier and is rejected, not dropped
        if segments.iter().any(|s| s.is_empty()) {
            return Err(invalid(name));
        }

        match segments.as_slice() {
            [schema, element] => Ok(Self::new(schema, element, None)),
            [schema, element, qualifier] => Ok(Self::new(schema, element, Some(qualifier))),
            _ => Err(invalid(name)),
        }
    }
}

fn invalid(name: &str) -> Error {
    Error::InvalidInput(format!("could not parse field name: {:?}", name))
}

impl FromStr for QualifiedFieldName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for QualifiedFieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&qualified_name(
            &self.schema,
            &self.element,
            self.qualifier.as_deref(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_segments_have_no_qualifier() {
        let name = QualifiedFieldName::parse("dc.title").unwrap();
        assert_eq!(name, QualifiedFieldName::new("dc", "title", None));
    }

    #[test]
    fn three_segments_carry_qualifier() {
        let name: QualifiedFieldName = "dc.contributor.author".parse().unwrap();
        assert_eq!(name.schema, "dc");
        assert_eq!(name.element, "contributor");
        assert_eq!(name.qualifier.as_deref(), Some("author"));
    }

    #[test]
    fn undotted_name_rejected() {
        let err = QualifiedFieldName::parse("title").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn four_segments_rejected() {
        assert!(matches!(
            QualifiedFieldName::parse("dc.a.b.c"),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn empty_segments_rejected() {
        for name in ["", ".", "dc..title", "dc.title.", ".title"] {
            assert!(
                QualifiedFieldName::parse(name).is_err(),
                "{:?} should not parse",
                name
            );
        }
    }

    #[test]
    fn trailing_dot_is_not_an_unqualified_name() {
        let err = QualifiedFieldName::parse("dc.title.").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn no_case_folding_or_trimming() {
        let name = QualifiedFieldName::parse("DC. title").unwrap();
        assert_eq!(name.schema, "DC");
        assert_eq!(name.element, " title");
    }

    #[test]
    fn display_matches_input() {
        for raw in ["dc.title", "dc.date.issued"] {
            assert_eq!(QualifiedFieldName::parse(raw).unwrap().to_string(), raw);
        }
    }
}
