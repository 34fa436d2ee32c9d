//! Database models

use crate::authority::{ConfidenceLevel, UnknownConfidence};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};
use std::fmt;

/// `schema.element[.qualifier]`
pub fn qualified_name(schema: &str, element: &str, qualifier: Option<&str>) -> String {
    match qualifier {
        Some(q) => format!("{}.{}.{}", schema, element, q),
        None => format!("{}.{}", schema, element),
    }
}

/// Read the `confidence` column, rejecting codes outside the vocabulary
fn decode_confidence(row: &SqliteRow) -> Result<ConfidenceLevel, sqlx::Error> {
    let code: i64 = row.try_get("confidence")?;
    ConfidenceLevel::from_code(code)
        .ok_or_else(|| sqlx::Error::Decode(Box::new(UnknownConfidence(code.to_string()))))
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EPerson {
    pub id: i64,
    pub email: String,
    pub is_admin: bool,
}

/// Registered metadata field with its schema short name resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct MetadataFieldDescriptor {
    pub id: i64,
    pub schema_name: String,
    pub element: String,
    pub qualifier: Option<String>,
}

impl MetadataFieldDescriptor {
    pub fn display_name(&self) -> String {
        qualified_name(&self.schema_name, &self.element, self.qualifier.as_deref())
    }
}

/// Raw `metadata_fields` row; the schema is still an internal id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct MetadataFieldRecord {
    pub id: i64,
    pub schema_id: i64,
    pub element: String,
    pub qualifier: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataValueRecord {
    pub id: i64,
    pub item_id: i64,
    pub field_id: i64,
    pub value: String,
    pub language: Option<String>,
    pub authority: Option<String>,
    pub confidence: ConfidenceLevel,
}

impl<'r> FromRow<'r, SqliteRow> for MetadataValueRecord {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            item_id: row.try_get("item_id")?,
            field_id: row.try_get("field_id")?,
            value: row.try_get("value")?,
            language: row.try_get("language")?,
            authority: row.try_get("authority")?,
            confidence: decode_confidence(row)?,
        })
    }
}

/// Value to be written; the id is assigned on insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMetadataValue {
    pub field_id: i64,
    pub value: String,
    pub language: Option<String>,
    pub authority: Option<String>,
    pub confidence: ConfidenceLevel,
}

/// Metadata value joined with its field's display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub id: i64,
    pub field_id: i64,
    pub name: String,
    pub value: String,
    pub language: Option<String>,
    pub authority: Option<String>,
    pub confidence: ConfidenceLevel,
}

impl<'r> FromRow<'r, SqliteRow> for MetadataEntry {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let schema: String = row.try_get("schema_name")?;
        let element: String = row.try_get("element")?;
        let qualifier: Option<String> = row.try_get("qualifier")?;
        let name = qualified_name(&schema, &element, qualifier.as_deref());

        Ok(Self {
            id: row.try_get("id")?,
            field_id: row.try_get("field_id")?,
            name,
            value: row.try_get("value")?,
            language: row.try_get("language")?,
            authority: row.try_get("authority")?,
            confidence: decode_confidence(row)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Item {
    pub id: i64,
    pub handle: Option<String>,
    pub submitter_id: Option<i64>,
    pub owning_collection_id: Option<i64>,
    pub in_archive: bool,
    pub withdrawn: bool,
    /// Unix epoch seconds
    pub last_modified: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Collection {
    pub id: i64,
    pub name: String,
    pub handle: Option<String>,
    pub short_description: Option<String>,
    pub introductory_text: Option<String>,
    pub copyright_text: Option<String>,
    pub side_bar_text: Option<String>,
    pub license: Option<String>,
    pub provenance_description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Community {
    pub id: i64,
    pub name: String,
    pub handle: Option<String>,
    pub short_description: Option<String>,
    pub introductory_text: Option<String>,
    pub copyright_text: Option<String>,
    pub parent_id: Option<i64>,
}

/// Bitstream joined with its format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Bitstream {
    pub id: i64,
    pub item_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub format: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub checksum: Option<String>,
    pub sequence_id: i64,
    /// Format is managed by the repository (licenses and the like)
    #[serde(skip_serializing, default)]
    pub internal: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: i64,
    pub item_id: i64,
    pub parent_id: Option<i64>,
    pub author_id: Option<i64>,
    pub body: String,
    /// Unix epoch seconds
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Rating {
    pub id: i64,
    pub item_id: i64,
    pub eperson_id: i64,
    pub value: i64,
    /// Unix epoch seconds
    pub created_at: i64,
}

/// Action a resource policy grants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Read,
    Write,
}

impl Action {
    /// Value stored in `resource_policies.action`
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Read => "READ",
            Action::Write => "WRITE",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_with_and_without_qualifier() {
        let mut field = MetadataFieldDescriptor {
            id: 5,
            schema_name: "dc".to_string(),
            element: "title".to_string(),
            qualifier: None,
        };
        assert_eq!(field.display_name(), "dc.title");

        field.qualifier = Some("alternative".to_string());
        assert_eq!(field.display_name(), "dc.title.alternative");
    }

    #[test]
    fn qualified_name_formats() {
        assert_eq!(qualified_name("dc", "date", Some("issued")), "dc.date.issued");
        assert_eq!(qualified_name("dc", "date", None), "dc.date");
    }

    #[test]
    fn action_policy_strings() {
        assert_eq!(Action::Read.as_str(), "READ");
        assert_eq!(Action::Write.to_string(), "WRITE");
    }
}
