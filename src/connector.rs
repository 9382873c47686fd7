//! Write operations via the Zotero Connector API.
//!
//! The Connector is the only write path this crate uses; the local database
//! is never written to.

use crate::client::ZoteroClient;
use crate::error::{Result, ZoteroError};
use crate::format::text_to_html;
use crate::template::{build_metadata, render_review};
use serde_json::json;

impl ZoteroClient {
    /// Create a batch of items via the Connector saveItems endpoint.
    ///
    /// Each entry is a full item payload (`itemType`, fields, ...). Failures
    /// keep their taxonomy: [`ZoteroError::NotRunning`] when the endpoint is
    /// unreachable, [`ZoteroError::Timeout`] on timeout, and
    /// [`ZoteroError::Api`] for a non-2xx response.
    pub async fn save_items(&self, items: &[serde_json::Value]) -> Result<()> {
        let payload = json!({
            "libraryID": self.config.connector_library_id,
            "items": items,
        });
        self.connector_post("/saveItems", &payload).await?;
        Ok(())
    }

    /// Create a note, optionally attached to a parent item.
    ///
    /// Plain-text content is upgraded to HTML paragraphs; content that is
    /// already HTML passes through unchanged.
    pub async fn create_note(
        &self,
        content: &str,
        parent_key: Option<&str>,
        tags: &[&str],
    ) -> Result<()> {
        let note = note_payload(&text_to_html(content), parent_key, tags);
        self.save_items(std::slice::from_ref(&note)).await
    }

    /// Render a review template for an item and attach the result as a note.
    ///
    /// The template text is supplied by the caller; this crate only defines
    /// the substitution grammar. Returns the title of the reviewed item.
    pub async fn save_review(
        &self,
        item_key: &str,
        template: &str,
        analysis: &serde_json::Map<String, serde_json::Value>,
        tags: &[&str],
    ) -> Result<String> {
        let item = self
            .get_item(item_key)
            .await?
            .ok_or_else(|| ZoteroError::NotFound(format!("no item with key {}", item_key)))?;

        let metadata = build_metadata(&item);
        let html = render_review(template, &metadata, analysis);

        let note = note_payload(&html, Some(item_key), tags);
        self.save_items(std::slice::from_ref(&note)).await?;

        Ok(item.title().to_string())
    }
}

/// Build a note item payload for the Connector.
fn note_payload(html: &str, parent_key: Option<&str>, tags: &[&str]) -> serde_json::Value {
    let mut note = json!({
        "itemType": "note",
        "note": html,
        "tags": tags.iter().map(|t| json!({ "tag": t })).collect::<Vec<_>>(),
    });
    if let Some(parent) = parent_key {
        note["parentItem"] = json!(parent);
    }
    note
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ZoteroConfig;

    #[test]
    fn test_note_payload_shape() {
        let note = note_payload("<p>hi</p>", Some("PARENT1"), &["review", "ai"]);
        assert_eq!(note["itemType"], "note");
        assert_eq!(note["note"], "<p>hi</p>");
        assert_eq!(note["parentItem"], "PARENT1");
        assert_eq!(note["tags"][0]["tag"], "review");
        assert_eq!(note["tags"][1]["tag"], "ai");
    }

    #[test]
    fn test_standalone_note_has_no_parent() {
        let note = note_payload("<p>hi</p>", None, &[]);
        assert!(note.get("parentItem").is_none());
        assert_eq!(note["tags"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_is_running_collapses_failures_to_false() {
        // Port 1 refuses connections; the probe must not error.
        let config = ZoteroConfig::default()
            .with_base_urls("http://127.0.0.1:1/api", "http://127.0.0.1:1/connector")
            .unwrap();
        let client = ZoteroClient::new(config).unwrap();
        assert!(!client.is_running().await);
    }

    #[tokio::test]
    async fn test_save_items_error_keeps_upstream_status_and_body() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        // Minimal stub endpoint: answer any request with a 404 and a
        // diagnostic body, the way Zotero reports a disabled endpoint.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 2048];
            let _ = socket.read(&mut buf).await;
            let body = "saveItems endpoint not available";
            let response = format!(
                "HTTP/1.1 404 Not Found\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
        });

        let config = ZoteroConfig::default()
            .with_base_urls(
                format!("http://{}/api", addr),
                format!("http://{}/connector", addr),
            )
            .unwrap();
        let client = ZoteroClient::new(config).unwrap();

        let err = client
            .save_items(&[json!({ "itemType": "note" })])
            .await
            .unwrap_err();
        match err {
            ZoteroError::Api { status, message } => {
                assert_eq!(status, 404);
                assert!(message.contains("saveItems endpoint not available"));
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_save_items_unreachable_is_not_running() {
        let config = ZoteroConfig::default()
            .with_base_urls("http://127.0.0.1:1/api", "http://127.0.0.1:1/connector")
            .unwrap();
        let client = ZoteroClient::new(config).unwrap();

        let result = client.save_items(&[json!({ "itemType": "note" })]).await;
        assert!(matches!(result, Err(ZoteroError::NotRunning(_))));
    }
}
