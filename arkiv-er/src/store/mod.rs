//! Persistence and authorization contracts consumed by the core
//!
//! The metadata, projection and listing logic only talks to these traits.
//! [`SqliteRepository`] implements all of them over the shared pool.

use crate::metadata::QualifiedFieldName;
use crate::pagination::Window;
use arkiv_common::db::{
    Action, Bitstream, Collection, Comment, Community, Item, MetadataEntry,
    MetadataFieldDescriptor, MetadataFieldRecord, MetadataValueRecord, NewMetadataValue, Rating,
};
use arkiv_common::Result;
use async_trait::async_trait;

mod sqlite;

pub use sqlite::SqliteRepository;

/// Decides whether a principal may perform an action on an item
#[async_trait]
pub trait Authorizer: Send + Sync {
    /// `Ok(())` when allowed, `Error::Forbidden` otherwise.
    ///
    /// `principal` is the authenticated eperson id, `None` for anonymous callers.
    async fn authorize(&self, principal: Option<i64>, item_id: i64, action: Action) -> Result<()>;
}

/// Read-only view of the externally maintained field registry
#[async_trait]
pub trait FieldRegistry: Send + Sync {
    async fn find_field(&self, field_id: i64) -> Result<Option<MetadataFieldRecord>>;

    async fn find_schema_name(&self, schema_id: i64) -> Result<Option<String>>;

    /// Exact-string match on schema short name, element and qualifier
    async fn find_field_by_name(
        &self,
        name: &QualifiedFieldName,
    ) -> Result<Option<MetadataFieldDescriptor>>;

    async fn list_fields(&self) -> Result<Vec<MetadataFieldDescriptor>>;
}

#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn find_item(&self, item_id: i64) -> Result<Option<Item>>;

    /// Metadata values of the item in insertion order
    async fn item_metadata(&self, item_id: i64) -> Result<Vec<MetadataEntry>>;

    /// Append one value and update the item's modification time.
    /// Returns the id of the new value.
    async fn append_metadata(&self, item_id: i64, value: &NewMetadataValue) -> Result<i64>;

    /// Remove every value of the item and insert `values` in order.
    ///
    /// All or nothing: on error the item's metadata is left as it was.
    async fn replace_metadata(&self, item_id: i64, values: &[NewMetadataValue]) -> Result<()>;
}

#[async_trait]
pub trait MetadataValueStore: Send + Sync {
    async fn find_value(&self, value_id: i64) -> Result<Option<MetadataValueRecord>>;

    /// Delete the value and update its item's modification time
    async fn delete_value(&self, value: &MetadataValueRecord) -> Result<()>;
}

/// Collections and communities an item can be projected with
#[async_trait]
pub trait ContainerStore: Send + Sync {
    async fn find_collection(&self, collection_id: i64) -> Result<Option<Collection>>;

    /// Communities the collection is mapped into
    async fn collection_community_ids(&self, collection_id: i64) -> Result<Vec<i64>>;

    /// Archived items owned by the collection
    async fn count_collection_items(&self, collection_id: i64) -> Result<i64>;

    async fn find_community(&self, community_id: i64) -> Result<Option<Community>>;
}

#[async_trait]
pub trait RelatedResourceStore: Send + Sync {
    /// Every bitstream of the item, internal formats included, by id
    async fn list_bitstreams(&self, item_id: i64) -> Result<Vec<Bitstream>>;

    /// Comments without a parent, by id, restricted to `window`
    async fn list_top_comments(&self, item_id: i64, window: Window) -> Result<Vec<Comment>>;

    /// Comments at every nesting level
    async fn count_comments(&self, item_id: i64) -> Result<i64>;

    async fn find_rating(&self, item_id: i64, eperson_id: i64) -> Result<Option<Rating>>;
}
