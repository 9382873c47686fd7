//! Collection and tag endpoints, plus the pure hierarchy builder.

use crate::client::ZoteroClient;
use crate::error::{Result, ZoteroError};
use crate::types::{Collection, Item};
use std::collections::BTreeMap;

impl ZoteroClient {
    /// List collections in the library.
    pub async fn collections(&self, limit: Option<u32>) -> Result<Vec<Collection>> {
        let limit_str;
        let mut params: Vec<(&str, &str)> = Vec::new();
        if let Some(limit) = limit {
            limit_str = limit.to_string();
            params.push(("limit", limit_str.as_str()));
        }

        let body = self.get("/collections", &params).await?;
        serde_json::from_str(&body)
            .map_err(|e| ZoteroError::Parse(format!("invalid collections response: {}", e)))
    }

    /// Fetch a single collection by key; a missing key maps to `Ok(None)`.
    pub async fn collection(&self, key: &str) -> Result<Option<Collection>> {
        match self.get(&format!("/collections/{}", key), &[]).await {
            Ok(body) => {
                let coll = serde_json::from_str(&body).map_err(|e| {
                    ZoteroError::Parse(format!("invalid collection response: {}", e))
                })?;
                Ok(Some(coll))
            }
            Err(ZoteroError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// List the items in a collection.
    pub async fn collection_items(
        &self,
        key: &str,
        limit: u32,
        item_type: Option<&str>,
    ) -> Result<Vec<Item>> {
        let limit_str = limit.to_string();
        let mut params = vec![("limit", limit_str.as_str())];
        if let Some(filter) = item_type {
            if !filter.is_empty() {
                params.push(("itemType", filter));
            }
        }

        let body = self
            .get(&format!("/collections/{}/items", key), &params)
            .await?;
        serde_json::from_str(&body)
            .map_err(|e| ZoteroError::Parse(format!("invalid collection items response: {}", e)))
    }

    /// List tags used in the library.
    pub async fn tags(&self, limit: Option<u32>) -> Result<Vec<String>> {
        let limit_str;
        let mut params: Vec<(&str, &str)> = Vec::new();
        if let Some(limit) = limit {
            limit_str = limit.to_string();
            params.push(("limit", limit_str.as_str()));
        }

        let body = self.get("/tags", &params).await?;
        let parsed: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| ZoteroError::Parse(format!("invalid tags response: {}", e)))?;

        Ok(parsed
            .as_array()
            .map(|tags| {
                tags.iter()
                    .filter_map(|t| t["tag"].as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// A node in the collection hierarchy.
#[derive(Debug, Clone)]
pub struct CollectionNode {
    pub key: String,
    pub name: String,
    pub children: Vec<CollectionNode>,
}

/// Build the collection tree from a flat listing.
///
/// A collection whose parent key does not appear in the input is treated as a
/// root; siblings are ordered by key. No cycle detection is performed — the
/// owning application does not produce cyclic collections.
pub fn build_collection_tree(collections: &[Collection]) -> Vec<CollectionNode> {
    let known: BTreeMap<&str, &Collection> = collections
        .iter()
        .map(|c| (c.key.as_str(), c))
        .collect();

    // Parent key -> sorted child keys; None bucket holds the roots.
    let mut children_of: BTreeMap<Option<&str>, Vec<&str>> = BTreeMap::new();
    for coll in collections {
        let parent = coll
            .data
            .parent_collection
            .as_deref()
            .filter(|p| known.contains_key(p));
        children_of.entry(parent).or_default().push(coll.key.as_str());
    }

    fn build(
        key: &str,
        known: &BTreeMap<&str, &Collection>,
        children_of: &BTreeMap<Option<&str>, Vec<&str>>,
    ) -> CollectionNode {
        let coll = known[key];
        let children = children_of
            .get(&Some(key))
            .map(|keys| {
                keys.iter()
                    .map(|child| build(child, known, children_of))
                    .collect()
            })
            .unwrap_or_default();

        CollectionNode {
            key: coll.key.clone(),
            name: coll
                .data
                .name
                .clone()
                .unwrap_or_else(|| "Unnamed".to_string()),
            children,
        }
    }

    children_of
        .get(&None)
        .map(|roots| {
            roots
                .iter()
                .map(|key| build(key, &known, &children_of))
                .collect()
        })
        .unwrap_or_default()
}
