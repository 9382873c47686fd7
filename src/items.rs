//! Item read endpoints.
//!
//! Covers: keyword search, get-by-key, child listing, recent items,
//! full-text lookup, and the combined children view that merges API data
//! with local-database annotations.

use crate::client::ZoteroClient;
use crate::error::{Result, ZoteroError};
use crate::local_db::LocalDatabase;
use crate::types::{Annotation, Item, ItemChildren, ItemType, QueryMode, RecentSort};
use tracing::warn;

/// Item-type filter excluding attachments (the search default).
pub const EXCLUDE_ATTACHMENTS: &str = "-attachment";
/// Item-type filter excluding attachments and notes.
pub const PAPERS_ONLY: &str = "-attachment -note";

impl ZoteroClient {
    /// Search the library for items matching a keyword.
    ///
    /// Matches title/creator/year and excludes attachments; use
    /// [`search_items_with_options`](Self::search_items_with_options) for
    /// full control.
    pub async fn search_items(&self, query: &str, limit: u32) -> Result<Vec<Item>> {
        self.search_items_with_options(query, QueryMode::TitleCreatorYear, EXCLUDE_ATTACHMENTS, limit, &[])
            .await
    }

    /// Search with full control over scope, item-type filter, and tags.
    ///
    /// All parameters are passed through to the API verbatim; this layer adds
    /// no search semantics of its own.
    pub async fn search_items_with_options(
        &self,
        query: &str,
        qmode: QueryMode,
        item_type: &str,
        limit: u32,
        tags: &[&str],
    ) -> Result<Vec<Item>> {
        if query.trim().is_empty() {
            return Err(ZoteroError::InvalidQuery(
                "search query cannot be empty".to_string(),
            ));
        }

        let limit_str = limit.to_string();
        let mut params = vec![
            ("q", query),
            ("qmode", qmode.as_api_str()),
            ("limit", limit_str.as_str()),
        ];
        if !item_type.is_empty() {
            params.push(("itemType", item_type));
        }
        for tag in tags {
            params.push(("tag", tag));
        }

        let body = self.get("/items", &params).await?;
        parse_items(&body)
    }

    /// Fetch a single item by key.
    ///
    /// A missing key is an expected outcome and maps to `Ok(None)`; an
    /// unreachable Zotero is still an error.
    pub async fn get_item(&self, key: &str) -> Result<Option<Item>> {
        match self.get(&format!("/items/{}", key), &[]).await {
            Ok(body) => {
                let item = serde_json::from_str(&body)
                    .map_err(|e| ZoteroError::Parse(format!("invalid item response: {}", e)))?;
                Ok(Some(item))
            }
            Err(ZoteroError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// List an item's direct children (attachments and notes).
    pub async fn item_children(&self, key: &str) -> Result<Vec<Item>> {
        let body = self.get(&format!("/items/{}/children", key), &[]).await?;
        parse_items(&body)
    }

    /// List recently added or modified items, newest first.
    ///
    /// `item_type` filters the listing (`None` applies no filter); `limit` is
    /// clamped to 1..=100.
    pub async fn recent_items(
        &self,
        limit: u32,
        sort: RecentSort,
        item_type: Option<&str>,
    ) -> Result<Vec<Item>> {
        let limit_str = limit.clamp(1, 100).to_string();
        let mut params = vec![
            ("limit", limit_str.as_str()),
            ("sort", sort.as_api_str()),
            ("direction", "desc"),
        ];
        if let Some(filter) = item_type {
            if !filter.is_empty() {
                params.push(("itemType", filter));
            }
        }

        let body = self.get("/items", &params).await?;
        parse_items(&body)
    }

    /// Fetch the indexed full text of an attachment.
    ///
    /// Returns `Ok(None)` when the attachment has no full-text index entry.
    pub async fn item_fulltext(&self, attachment_key: &str) -> Result<Option<String>> {
        match self
            .get(&format!("/items/{}/fulltext", attachment_key), &[])
            .await
        {
            Ok(body) => {
                let parsed: serde_json::Value = serde_json::from_str(&body)
                    .map_err(|e| ZoteroError::Parse(format!("invalid fulltext response: {}", e)))?;
                Ok(parsed["content"]
                    .as_str()
                    .filter(|c| !c.is_empty())
                    .map(String::from))
            }
            Err(ZoteroError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Build the combined children view of an item: attachments and notes
    /// from the API, PDF annotations from the local database.
    ///
    /// The API call is load-bearing and its failure propagates. Annotation
    /// retrieval degrades instead: a failed or absent local database leaves
    /// the annotations empty and, on failure, records a warning in the view.
    pub async fn item_children_view(
        &self,
        db: Option<&LocalDatabase>,
        item_key: &str,
    ) -> Result<ItemChildren> {
        let children = self.item_children(item_key).await?;
        let annotations = db.map(|db| db.annotations_for_item(item_key));
        Ok(assemble_children_view(item_key, children, annotations))
    }
}

/// Partition API children by type and merge the annotation outcome.
///
/// An annotation failure degrades into a warning on the view rather than
/// discarding the API data; `None` means no database was supplied.
fn assemble_children_view(
    item_key: &str,
    children: Vec<Item>,
    annotations: Option<Result<Vec<Annotation>>>,
) -> ItemChildren {
    let mut view = ItemChildren::default();
    for child in children {
        match child.data.item_type {
            ItemType::Attachment => view.attachments.push(child),
            ItemType::Note => view.notes.push(child),
            _ => {}
        }
    }

    match annotations {
        Some(Ok(annotations)) => view.annotations = annotations,
        Some(Err(e)) => {
            let message = format!("Could not retrieve annotations: {}", e);
            warn!(item_key, "{}", message);
            view.annotation_warning = Some(message);
        }
        None => {}
    }

    view
}

/// Parse a JSON array of items.
fn parse_items(body: &str) -> Result<Vec<Item>> {
    serde_json::from_str(body).map_err(|e| ZoteroError::Parse(format!("invalid items response: {}", e)))
}
