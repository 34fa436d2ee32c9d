//! Metadata field resolution, confidence semantics and mutation

pub mod confidence;
pub mod field_name;
pub mod mutator;

pub use confidence::{resolve_confidence, AuthorityAssignment, ConfidenceVocabulary, StandardVocabulary};
pub use field_name::QualifiedFieldName;
pub use mutator::{FieldValueInput, MetadataMutator};

use crate::store::FieldRegistry;
use arkiv_common::Result;
use serde::Serialize;

/// Registry entry as listed to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisteredField {
    pub id: i64,
    pub name: String,
}

/// Every registered field with its display name, by id
pub async fn list_registered_fields<R>(registry: &R) -> Result<Vec<RegisteredField>>
where
    R: FieldRegistry + ?Sized,
{
    let fields = registry.list_fields().await?;
    Ok(fields
        .into_iter()
        .map(|field| RegisteredField {
            id: field.id,
            name: field.display_name(),
        })
        .collect())
}
