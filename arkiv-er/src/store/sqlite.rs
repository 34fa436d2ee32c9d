//! SQLite implementation of the store contracts

use super::{
    Authorizer, ContainerStore, FieldRegistry, ItemStore, MetadataValueStore,
    RelatedResourceStore,
};
use crate::metadata::QualifiedFieldName;
use crate::pagination::Window;
use arkiv_common::db::{
    Action, Bitstream, Collection, Comment, Community, Item, MetadataEntry,
    MetadataFieldDescriptor, MetadataFieldRecord, MetadataValueRecord, NewMetadataValue, Rating,
};
use arkiv_common::{Error, Result};
use async_trait::async_trait;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;

/// Repository backed by the shared SQLite pool
#[derive(Debug, Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

async fn insert_value(
    tx: &mut Transaction<'_, Sqlite>,
    item_id: i64,
    value: &NewMetadataValue,
) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO metadata_values (item_id, field_id, value, language, authority, confidence)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(item_id)
    .bind(value.field_id)
    .bind(&value.value)
    .bind(&value.language)
    .bind(&value.authority)
    .bind(value.confidence.code())
    .execute(&mut **tx)
    .await?;

    Ok(result.last_insert_rowid())
}

async fn touch_item(tx: &mut Transaction<'_, Sqlite>, item_id: i64) -> Result<()> {
    sqlx::query("UPDATE items SET last_modified = ? WHERE id = ?")
        .bind(chrono::Utc::now().timestamp())
        .bind(item_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

#[async_trait]
impl Authorizer for SqliteRepository {
    async fn authorize(&self, principal: Option<i64>, item_id: i64, action: Action) -> Result<()> {
        if let Some(eperson_id) = principal {
            let is_admin: Option<bool> =
                sqlx::query_scalar("SELECT is_admin FROM epersons WHERE id = ?")
                    .bind(eperson_id)
                    .fetch_optional(&self.pool)
                    .await?;
            if is_admin == Some(true) {
                return Ok(());
            }
        }

        // A NULL eperson_id policy applies to everyone
        let allowed: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM resource_policies
                WHERE item_id = ?
                  AND action = ?
                  AND (eperson_id IS NULL OR eperson_id = ?)
            )
            "#,
        )
        .bind(item_id)
        .bind(action.as_str())
        .bind(principal)
        .fetch_one(&self.pool)
        .await?;

        if allowed {
            Ok(())
        } else {
            let who = principal
                .map(|id| format!("eperson {}", id))
                .unwrap_or_else(|| "anonymous".to_string());
            Err(Error::Forbidden(format!("{} may not {} item {}", who, action, item_id)))
        }
    }
}

#[async_trait]
impl FieldRegistry for SqliteRepository {
    async fn find_field(&self, field_id: i64) -> Result<Option<MetadataFieldRecord>> {
        let field = sqlx::query_as::<_, MetadataFieldRecord>(
            "SELECT id, schema_id, element, qualifier FROM metadata_fields WHERE id = ?",
        )
        .bind(field_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(field)
    }

    async fn find_schema_name(&self, schema_id: i64) -> Result<Option<String>> {
        let name = sqlx::query_scalar("SELECT short_id FROM metadata_schemas WHERE id = ?")
            .bind(schema_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(name)
    }

    async fn find_field_by_name(
        &self,
        name: &QualifiedFieldName,
    ) -> Result<Option<MetadataFieldDescriptor>> {
        // `IS` compares NULL qualifiers as equal
        let field = sqlx::query_as::<_, MetadataFieldDescriptor>(
            r#"
            SELECT f.id, s.short_id AS schema_name, f.element, f.qualifier
            FROM metadata_fields f
            JOIN metadata_schemas s ON s.id = f.schema_id
            WHERE s.short_id = ? AND f.element = ? AND f.qualifier IS ?
            "#,
        )
        .bind(&name.schema)
        .bind(&name.element)
        .bind(&name.qualifier)
        .fetch_optional(&self.pool)
        .await?;
        Ok(field)
    }

    async fn list_fields(&self) -> Result<Vec<MetadataFieldDescriptor>> {
        let fields = sqlx::query_as::<_, MetadataFieldDescriptor>(
            r#"
            SELECT f.id, s.short_id AS schema_name, f.element, f.qualifier
            FROM metadata_fields f
            JOIN metadata_schemas s ON s.id = f.schema_id
            ORDER BY f.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(fields)
    }
}

#[async_trait]
impl ItemStore for SqliteRepository {
    async fn find_item(&self, item_id: i64) -> Result<Option<Item>> {
        let item = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, handle, submitter_id, owning_collection_id, in_archive, withdrawn, last_modified
            FROM items
            WHERE id = ?
            "#,
        )
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(item)
    }

    async fn item_metadata(&self, item_id: i64) -> Result<Vec<MetadataEntry>> {
        let entries = sqlx::query_as::<_, MetadataEntry>(
            r#"
            SELECT v.id, v.field_id, s.short_id AS schema_name, f.element, f.qualifier,
                   v.value, v.language, v.authority, v.confidence
            FROM metadata_values v
            JOIN metadata_fields f ON f.id = v.field_id
            JOIN metadata_schemas s ON s.id = f.schema_id
            WHERE v.item_id = ?
            ORDER BY v.id
            "#,
        )
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    async fn append_metadata(&self, item_id: i64, value: &NewMetadataValue) -> Result<i64> {
        let mut tx = self.pool.begin().await?;
        let value_id = insert_value(&mut tx, item_id, value).await?;
        touch_item(&mut tx, item_id).await?;
        tx.commit().await?;

        debug!("Inserted metadata value {} on item {}", value_id, item_id);
        Ok(value_id)
    }

    async fn replace_metadata(&self, item_id: i64, values: &[NewMetadataValue]) -> Result<()> {
        // Dropping the transaction on any `?` below rolls everything back
        let mut tx = self.pool.begin().await?;

        let cleared = sqlx::query("DELETE FROM metadata_values WHERE item_id = ?")
            .bind(item_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        for value in values {
            insert_value(&mut tx, item_id, value).await?;
        }
        touch_item(&mut tx, item_id).await?;
        tx.commit().await?;

        debug!(
            "Replaced {} metadata values with {} on item {}",
            cleared,
            values.len(),
            item_id
        );
        Ok(())
    }
}

#[async_trait]
impl MetadataValueStore for SqliteRepository {
    async fn find_value(&self, value_id: i64) -> Result<Option<MetadataValueRecord>> {
        let value = sqlx::query_as::<_, MetadataValueRecord>(
            r#"
            SELECT id, item_id, field_id, value, language, authority, confidence
            FROM metadata_values
            WHERE id = ?
            "#,
        )
        .bind(value_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(value)
    }

    async fn delete_value(&self, value: &MetadataValueRecord) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM metadata_values WHERE id = ? AND item_id = ?")
            .bind(value.id)
            .bind(value.item_id)
            .execute(&mut *tx)
            .await?;
        touch_item(&mut tx, value.item_id).await?;
        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl ContainerStore for SqliteRepository {
    async fn find_collection(&self, collection_id: i64) -> Result<Option<Collection>> {
        let collection = sqlx::query_as::<_, Collection>(
            r#"
            SELECT id, name, handle, short_description, introductory_text, copyright_text,
                   side_bar_text, license, provenance_description
            FROM collections
            WHERE id = ?
            "#,
        )
        .bind(collection_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(collection)
    }

    async fn collection_community_ids(&self, collection_id: i64) -> Result<Vec<i64>> {
        let ids = sqlx::query_scalar(
            "SELECT community_id FROM collection_communities WHERE collection_id = ? ORDER BY community_id",
        )
        .bind(collection_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn count_collection_items(&self, collection_id: i64) -> Result<i64> {
        let count = sqlx::query_scalar(
            "SELECT COUNT(*) FROM items WHERE owning_collection_id = ? AND in_archive = 1",
        )
        .bind(collection_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn find_community(&self, community_id: i64) -> Result<Option<Community>> {
        let community = sqlx::query_as::<_, Community>(
            r#"
            SELECT id, name, handle, short_description, introductory_text, copyright_text, parent_id
            FROM communities
            WHERE id = ?
            "#,
        )
        .bind(community_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(community)
    }
}

#[async_trait]
impl RelatedResourceStore for SqliteRepository {
    async fn list_bitstreams(&self, item_id: i64) -> Result<Vec<Bitstream>> {
        let bitstreams = sqlx::query_as::<_, Bitstream>(
            r#"
            SELECT b.id, b.item_id, b.name, b.description,
                   f.short_description AS format, f.mime_type,
                   b.size_bytes, b.checksum, b.sequence_id, f.internal
            FROM bitstreams b
            JOIN bitstream_formats f ON f.id = b.format_id
            WHERE b.item_id = ?
            ORDER BY b.id
            "#,
        )
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(bitstreams)
    }

    async fn list_top_comments(&self, item_id: i64, window: Window) -> Result<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, item_id, parent_id, author_id, body, created_at
            FROM comments
            WHERE item_id = ? AND parent_id IS NULL
            ORDER BY id
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(item_id)
        .bind(window.limit)
        .bind(window.start)
        .fetch_all(&self.pool)
        .await?;
        Ok(comments)
    }

    async fn count_comments(&self, item_id: i64) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE item_id = ?")
            .bind(item_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn find_rating(&self, item_id: i64, eperson_id: i64) -> Result<Option<Rating>> {
        let rating = sqlx::query_as::<_, Rating>(
            r#"
            SELECT id, item_id, eperson_id, value, created_at
            FROM ratings
            WHERE item_id = ? AND eperson_id = ?
            "#,
        )
        .bind(item_id)
        .bind(eperson_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(rating)
    }
}
