//! Variably detailed item representations
//!
//! A request picks one [`DetailLevel`] up front and every related container
//! (owning collection, its communities, their parents) is rendered at that
//! level. `IdOnly` never touches the store.

use crate::store::{Authorizer, ContainerStore, ItemStore};
use arkiv_common::db::{Action, Collection, Community, Item, MetadataEntry};
use arkiv_common::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Community ancestors rendered in full before falling back to bare ids
pub const MAX_COMMUNITY_DEPTH: usize = 16;

/// Serialization granularity for related containers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailLevel {
    IdOnly,
    Trimmed,
    Full,
}

impl DetailLevel {
    pub fn from_flags(expand: bool, trim: bool) -> Self {
        match (expand, trim) {
            (false, _) => DetailLevel::IdOnly,
            (true, true) => DetailLevel::Trimmed,
            (true, false) => DetailLevel::Full,
        }
    }
}

/// `?collections=&trim=` query parameters
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ProjectionQuery {
    #[serde(default)]
    pub collections: bool,
    #[serde(default)]
    pub trim: bool,
}

impl ProjectionQuery {
    pub fn detail_level(&self) -> DetailLevel {
        DetailLevel::from_flags(self.collections, self.trim)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityRef {
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionSummary {
    pub id: i64,
    pub name: String,
    pub handle: Option<String>,
    pub short_description: Option<String>,
}

impl From<Collection> for CollectionSummary {
    fn from(c: Collection) -> Self {
        Self {
            id: c.id,
            name: c.name,
            handle: c.handle,
            short_description: c.short_description,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionDetail {
    #[serde(flatten)]
    pub collection: Collection,
    pub item_count: i64,
    pub communities: Vec<CommunityView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CollectionView {
    Id(EntityRef),
    Trimmed(CollectionSummary),
    Full(Box<CollectionDetail>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommunitySummary {
    pub id: i64,
    pub name: String,
    pub handle: Option<String>,
    pub short_description: Option<String>,
}

impl From<Community> for CommunitySummary {
    fn from(c: Community) -> Self {
        Self {
            id: c.id,
            name: c.name,
            handle: c.handle,
            short_description: c.short_description,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommunityDetail {
    #[serde(flatten)]
    pub community: Community,
    pub parent: Option<Box<CommunityView>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CommunityView {
    Id(EntityRef),
    Trimmed(CommunitySummary),
    Full(Box<CommunityDetail>),
}

impl CollectionView {
    pub fn id(&self) -> i64 {
        match self {
            CollectionView::Id(r) => r.id,
            CollectionView::Trimmed(s) => s.id,
            CollectionView::Full(d) => d.collection.id,
        }
    }
}

impl CommunityView {
    pub fn id(&self) -> i64 {
        match self {
            CommunityView::Id(r) => r.id,
            CommunityView::Trimmed(s) => s.id,
            CommunityView::Full(d) => d.community.id,
        }
    }
}

/// Item scalars, metadata and owning collection
#[derive(Debug, Clone, Serialize)]
pub struct ItemRepresentation {
    pub id: i64,
    /// First `dc.title` value
    pub name: Option<String>,
    pub handle: Option<String>,
    pub in_archive: bool,
    pub withdrawn: bool,
    pub last_modified: DateTime<Utc>,
    pub metadata: Vec<MetadataEntry>,
    pub collection: Option<CollectionView>,
}

/// Renders items and their containers at a fixed detail level
pub struct RepresentationProjector<'a, R: ?Sized> {
    repo: &'a R,
    level: DetailLevel,
}

impl<'a, R> RepresentationProjector<'a, R>
where
    R: ContainerStore + ?Sized,
{
    pub fn new(repo: &'a R, level: DetailLevel) -> Self {
        Self { repo, level }
    }

    pub fn level(&self) -> DetailLevel {
        self.level
    }

    pub async fn collection(&self, collection_id: i64) -> Result<CollectionView> {
        match self.level {
            DetailLevel::IdOnly => Ok(CollectionView::Id(EntityRef { id: collection_id })),
            DetailLevel::Trimmed => {
                let collection = self.load_collection(collection_id).await?;
                Ok(CollectionView::Trimmed(collection.into()))
            }
            DetailLevel::Full => {
                let collection = self.load_collection(collection_id).await?;
                let item_count = self.repo.count_collection_items(collection_id).await?;

                let mut communities = Vec::new();
                for community_id in self.repo.collection_community_ids(collection_id).await? {
                    communities.push(self.community(community_id).await?);
                }

                Ok(CollectionView::Full(Box::new(CollectionDetail {
                    collection,
                    item_count,
                    communities,
                })))
            }
        }
    }

    pub async fn community(&self, community_id: i64) -> Result<CommunityView> {
        match self.level {
            DetailLevel::IdOnly => Ok(CommunityView::Id(EntityRef { id: community_id })),
            DetailLevel::Trimmed => {
                let community = self.load_community(community_id).await?;
                Ok(CommunityView::Trimmed(community.into()))
            }
            DetailLevel::Full => self.full_community_chain(community_id).await,
        }
    }

    /// Walk up the parent chain, then nest from the topmost ancestor down
    async fn full_community_chain(&self, community_id: i64) -> Result<CommunityView> {
        let mut chain = Vec::new();
        let mut next = Some(community_id);
        let mut truncated_at = None;

        while let Some(id) = next {
            if chain.len() == MAX_COMMUNITY_DEPTH {
                warn!(
                    "Community {} nests deeper than {} levels; ancestor {} rendered by id",
                    community_id, MAX_COMMUNITY_DEPTH, id
                );
                truncated_at = Some(id);
                break;
            }
            let community = self.load_community(id).await?;
            next = community.parent_id;
            chain.push(community);
        }

        let mut parent = truncated_at.map(|id| Box::new(CommunityView::Id(EntityRef { id })));
        for community in chain.into_iter().rev() {
            parent = Some(Box::new(CommunityView::Full(Box::new(CommunityDetail {
                community,
                parent,
            }))));
        }

        parent
            .map(|view| *view)
            .ok_or_else(|| Error::Internal(format!("empty community chain for {}", community_id)))
    }

    async fn load_collection(&self, collection_id: i64) -> Result<Collection> {
        self.repo
            .find_collection(collection_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("collection {}", collection_id)))
    }

    async fn load_community(&self, community_id: i64) -> Result<Community> {
        self.repo
            .find_community(community_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("community {}", community_id)))
    }
}

impl<'a, R> RepresentationProjector<'a, R>
where
    R: ContainerStore + Authorizer + ItemStore + ?Sized,
{
    /// Item representation; requires READ on the item
    pub async fn item(&self, principal: Option<i64>, item_id: i64) -> Result<ItemRepresentation> {
        let item = self.readable_item(principal, item_id).await?;
        let last_modified = DateTime::from_timestamp(item.last_modified, 0).ok_or_else(|| {
            Error::Internal(format!(
                "item {} has out-of-range last_modified {}",
                item.id, item.last_modified
            ))
        })?;
        let metadata = self.repo.item_metadata(item.id).await?;

        let collection = match item.owning_collection_id {
            Some(collection_id) => Some(self.collection(collection_id).await?),
            None => None,
        };

        let name = metadata
            .iter()
            .find(|entry| entry.name == "dc.title")
            .map(|entry| entry.value.clone());

        Ok(ItemRepresentation {
            id: item.id,
            name,
            handle: item.handle,
            in_archive: item.in_archive,
            withdrawn: item.withdrawn,
            last_modified,
            metadata,
            collection,
        })
    }

    /// Metadata values of the item; requires READ on the item
    pub async fn metadata(&self, principal: Option<i64>, item_id: i64) -> Result<Vec<MetadataEntry>> {
        let item = self.readable_item(principal, item_id).await?;
        self.repo.item_metadata(item.id).await
    }

    async fn readable_item(&self, principal: Option<i64>, item_id: i64) -> Result<Item> {
        let item = self
            .repo
            .find_item(item_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("item {}", item_id)))?;
        self.repo.authorize(principal, item.id, Action::Read).await?;
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_level_from_flags() {
        assert_eq!(DetailLevel::from_flags(false, false), DetailLevel::IdOnly);
        assert_eq!(DetailLevel::from_flags(false, true), DetailLevel::IdOnly);
        assert_eq!(DetailLevel::from_flags(true, true), DetailLevel::Trimmed);
        assert_eq!(DetailLevel::from_flags(true, false), DetailLevel::Full);
    }

    #[test]
    fn id_only_serializes_as_bare_ref() {
        let view = CollectionView::Id(EntityRef { id: 7 });
        assert_eq!(serde_json::to_value(&view).unwrap(), serde_json::json!({"id": 7}));
    }

    #[test]
    fn full_community_flattens_scalars() {
        let view = CommunityView::Full(Box::new(CommunityDetail {
            community: Community {
                id: 2,
                name: "Physics".to_string(),
                handle: None,
                short_description: None,
                introductory_text: None,
                copyright_text: None,
                parent_id: Some(1),
            },
            parent: Some(Box::new(CommunityView::Id(EntityRef { id: 1 }))),
        }));

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["id"], 2);
        assert_eq!(json["name"], "Physics");
        assert_eq!(json["parent"], serde_json::json!({"id": 1}));
        assert_eq!(view.id(), 2);
    }

    #[test]
    fn projection_query_defaults_to_id_only() {
        assert_eq!(ProjectionQuery::default().detail_level(), DetailLevel::IdOnly);
    }
}
