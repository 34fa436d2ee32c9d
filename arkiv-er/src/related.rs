//! Bitstream, comment and rating listings scoped to one item

use crate::pagination::Window;
use crate::store::{Authorizer, ItemStore, RelatedResourceStore};
use arkiv_common::db::{Action, Bitstream, Comment, Item, Rating};
use arkiv_common::{Error, Result};
use serde::Serialize;

/// The caller's own rating of an item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RatingView {
    Rated(Rating),
    /// Authenticated, no rating recorded
    NotRated,
    /// No principal on the request
    Anonymous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CommentCount {
    pub count: i64,
}

pub struct RelatedResourceLister<'a, R: ?Sized> {
    repo: &'a R,
}

impl<'a, R> RelatedResourceLister<'a, R>
where
    R: Authorizer + ItemStore + RelatedResourceStore + ?Sized,
{
    pub fn new(repo: &'a R) -> Self {
        Self { repo }
    }

    /// User-facing bitstreams of the item; requires READ
    ///
    /// Internal formats are dropped before the window is applied.
    pub async fn bitstreams(
        &self,
        principal: Option<i64>,
        item_id: i64,
        window: Window,
    ) -> Result<Vec<Bitstream>> {
        let item = self.existing_item(item_id).await?;
        self.repo.authorize(principal, item.id, Action::Read).await?;

        let skip = usize::try_from(window.start).unwrap_or(usize::MAX);
        let take = usize::try_from(window.limit).unwrap_or(0);

        Ok(self
            .repo
            .list_bitstreams(item.id)
            .await?
            .into_iter()
            .filter(|b| !b.internal)
            .skip(skip)
            .take(take)
            .collect())
    }

    /// Comments without a parent, oldest first
    pub async fn top_comments(&self, item_id: i64, window: Window) -> Result<Vec<Comment>> {
        let item = self.existing_item(item_id).await?;
        self.repo.list_top_comments(item.id, window).await
    }

    pub async fn comment_count(&self, item_id: i64) -> Result<CommentCount> {
        let item = self.existing_item(item_id).await?;
        let count = self.repo.count_comments(item.id).await?;
        Ok(CommentCount { count })
    }

    pub async fn rating(&self, principal: Option<i64>, item_id: i64) -> Result<RatingView> {
        let Some(eperson_id) = principal else {
            return Ok(RatingView::Anonymous);
        };

        let item = self.existing_item(item_id).await?;
        Ok(match self.repo.find_rating(item.id, eperson_id).await? {
            Some(rating) => RatingView::Rated(rating),
            None => RatingView::NotRated,
        })
    }

    async fn existing_item(&self, item_id: i64) -> Result<Item> {
        self.repo
            .find_item(item_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("item {}", item_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_view_tags() {
        let json = serde_json::to_value(RatingView::Anonymous).unwrap();
        assert_eq!(json, serde_json::json!({"status": "anonymous"}));

        let json = serde_json::to_value(RatingView::NotRated).unwrap();
        assert_eq!(json, serde_json::json!({"status": "not_rated"}));

        let rated = RatingView::Rated(Rating {
            id: 1,
            item_id: 42,
            eperson_id: 3,
            value: 4,
            created_at: 0,
        });
        let json = serde_json::to_value(rated).unwrap();
        assert_eq!(json["status"], "rated");
        assert_eq!(json["value"], 4);
    }
}
