//! Authorized metadata mutations on a single item

use super::confidence::{resolve_confidence, ConfidenceVocabulary, StandardVocabulary};
use super::field_name::QualifiedFieldName;
use crate::store::{Authorizer, FieldRegistry, ItemStore, MetadataValueStore};
use arkiv_common::db::{qualified_name, Action, Item, NewMetadataValue};
use arkiv_common::{ConfidenceLevel, Error, Result};
use serde::Deserialize;
use tracing::{debug, info};

/// One value of a replacement payload
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldValueInput {
    /// Qualified field name, `schema.element[.qualifier]`
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub authority: Option<String>,
    #[serde(default)]
    pub confidence: Option<String>,
    #[serde(default, alias = "lang")]
    pub language: Option<String>,
}

/// Applies AddField, ReplaceAll and RemoveOne under WRITE authorization
pub struct MetadataMutator<'a, R: ?Sized> {
    repo: &'a R,
    vocabulary: &'a dyn ConfidenceVocabulary,
}

impl<'a, R> MetadataMutator<'a, R>
where
    R: Authorizer + FieldRegistry + ItemStore + MetadataValueStore + ?Sized,
{
    pub fn new(repo: &'a R) -> Self {
        Self {
            repo,
            vocabulary: &StandardVocabulary,
        }
    }

    pub fn with_vocabulary(repo: &'a R, vocabulary: &'a dyn ConfidenceVocabulary) -> Self {
        Self { repo, vocabulary }
    }

    /// Append a single value to the item by registered field id
    ///
    /// Returns the item id as text.
    pub async fn add_field(
        &self,
        principal: Option<i64>,
        item_id: i64,
        field_id: i64,
        language: Option<String>,
        value: String,
    ) -> Result<String> {
        let item = self.writable_item(principal, item_id).await?;

        let field = self
            .repo
            .find_field(field_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("metadata field {}", field_id)))?;
        let schema = self
            .repo
            .find_schema_name(field.schema_id)
            .await?
            .ok_or_else(|| {
                Error::Internal(format!(
                    "metadata schema {} of field {} not registered",
                    field.schema_id, field.id
                ))
            })?;
        let name = qualified_name(&schema, &field.element, field.qualifier.as_deref());

        let new_value = NewMetadataValue {
            field_id,
            value,
            language: language.filter(|l| !l.is_empty()),
            authority: None,
            confidence: ConfidenceLevel::Unset,
        };
        let value_id = self.repo.append_metadata(item.id, &new_value).await?;

        info!(
            "Added metadata value {} ({}) to item {}",
            value_id, name, item.id
        );
        Ok(item.id.to_string())
    }

    /// Replace every value of the item with `inputs`, in order
    ///
    /// Every input is resolved before anything is written; a single bad
    /// input leaves the item untouched.
    pub async fn replace_all(
        &self,
        principal: Option<i64>,
        item_id: i64,
        inputs: &[FieldValueInput],
    ) -> Result<()> {
        let item = self.writable_item(principal, item_id).await?;

        let mut values = Vec::with_capacity(inputs.len());
        for input in inputs {
            values.push(self.resolve_input(input).await?);
        }

        self.repo.replace_metadata(item.id, &values).await?;

        info!("Replaced metadata of item {} with {} values", item.id, values.len());
        Ok(())
    }

    /// Delete one value, which must belong to the item
    pub async fn remove_one(&self, principal: Option<i64>, item_id: i64, value_id: i64) -> Result<()> {
        let item = self.writable_item(principal, item_id).await?;

        let value = match self.repo.find_value(value_id).await? {
            Some(value) if value.item_id == item.id => value,
            _ => {
                return Err(Error::Internal(
                    "no such metadata value or not belonging to this item".to_string(),
                ))
            }
        };

        self.repo.delete_value(&value).await?;

        info!("Removed metadata value {} from item {}", value_id, item.id);
        Ok(())
    }

    async fn writable_item(&self, principal: Option<i64>, item_id: i64) -> Result<Item> {
        let item = self
            .repo
            .find_item(item_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("item {}", item_id)))?;
        self.repo.authorize(principal, item.id, Action::Write).await?;
        Ok(item)
    }

    async fn resolve_input(&self, input: &FieldValueInput) -> Result<NewMetadataValue> {
        let name = QualifiedFieldName::parse(&input.name)?;
        let field = self
            .repo
            .find_field_by_name(&name)
            .await?
            .ok_or_else(|| Error::NotFound(format!("metadata field {}", name)))?;

        let assigned = resolve_confidence(
            input.authority.as_deref(),
            input.confidence.as_deref(),
            self.vocabulary,
        )?;
        debug!("Resolved {} to field {} ({})", name, field.id, assigned.confidence);

        Ok(NewMetadataValue {
            field_id: field.id,
            value: input.value.clone(),
            language: input.language.clone().filter(|l| !l.is_empty()),
            authority: assigned.authority,
            confidence: assigned.confidence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_accepts_lang_alias() {
        let input: FieldValueInput =
            serde_json::from_str(r#"{"name":"dc.title","value":"T","lang":"en"}"#).unwrap();
        assert_eq!(input.language.as_deref(), Some("en"));
        assert_eq!(input.authority, None);
        assert_eq!(input.confidence, None);
    }

    #[test]
    fn input_requires_name_and_value() {
        assert!(serde_json::from_str::<FieldValueInput>(r#"{"name":"dc.title"}"#).is_err());
        assert!(serde_json::from_str::<FieldValueInput>(r#"{"value":"x"}"#).is_err());
    }
}
