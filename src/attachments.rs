//! Best-attachment selection.

use crate::client::ZoteroClient;
use crate::types::{AttachmentDetails, Item, ItemType};
use tracing::debug;

impl ZoteroClient {
    /// Resolve the single best attachment for an item.
    ///
    /// An attachment item yields its own details. Otherwise the item's
    /// children are bucketed by content type and the first entry of the
    /// first non-empty bucket wins, in PDF > HTML > other priority order.
    /// No attachment, or a failed child listing, yields `None` — absence is
    /// an expected case, not a fault.
    pub async fn best_attachment(&self, item: &Item) -> Option<AttachmentDetails> {
        if item.data.item_type == ItemType::Attachment {
            return Some(attachment_details(item));
        }

        match self.item_children(&item.key).await {
            Ok(children) => select_from_children(&children),
            Err(e) => {
                debug!(item_key = %item.key, error = %e, "failed to fetch children");
                None
            }
        }
    }
}

/// Details view over an attachment item's own fields.
fn attachment_details(item: &Item) -> AttachmentDetails {
    AttachmentDetails {
        key: item.key.clone(),
        title: item.title().to_string(),
        filename: item.data.filename.clone().unwrap_or_default(),
        content_type: item.data.content_type.clone().unwrap_or_default(),
    }
}

/// Pick the best attachment among child items by content-type priority.
fn select_from_children(children: &[Item]) -> Option<AttachmentDetails> {
    let mut pdfs = Vec::new();
    let mut htmls = Vec::new();
    let mut others = Vec::new();

    for child in children {
        if child.data.item_type != ItemType::Attachment {
            continue;
        }
        let details = attachment_details(child);
        match details.content_type.as_str() {
            "application/pdf" => pdfs.push(details),
            ct if ct.starts_with("text/html") => htmls.push(details),
            _ => others.push(details),
        }
    }

    [pdfs, htmls, others]
        .into_iter()
        .find(|bucket| !bucket.is_empty())
        .and_then(|bucket| bucket.into_iter().next())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ItemData;

    fn attachment(key: &str, content_type: &str) -> Item {
        Item {
            key: key.to_string(),
            version: None,
            meta: None,
            data: ItemData {
                item_type: ItemType::Attachment,
                title: Some(format!("{} title", key)),
                filename: Some(format!("{}.bin", key)),
                content_type: Some(content_type.to_string()),
                ..Default::default()
            },
        }
    }

    fn note(key: &str) -> Item {
        Item {
            key: key.to_string(),
            version: None,
            meta: None,
            data: ItemData {
                item_type: ItemType::Note,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_pdf_beats_html_and_other() {
        let children = vec![
            attachment("OTH", "image/png"),
            attachment("HTML", "text/html; charset=utf-8"),
            attachment("PDF", "application/pdf"),
        ];
        let best = select_from_children(&children).unwrap();
        assert_eq!(best.key, "PDF");
        assert!(best.is_pdf());
    }

    #[test]
    fn test_html_beats_other() {
        let children = vec![
            attachment("OTH", "image/png"),
            attachment("HTML", "text/html"),
        ];
        let best = select_from_children(&children).unwrap();
        assert_eq!(best.key, "HTML");
    }

    #[test]
    fn test_first_of_bucket_wins() {
        let children = vec![
            attachment("PDF1", "application/pdf"),
            attachment("PDF2", "application/pdf"),
        ];
        assert_eq!(select_from_children(&children).unwrap().key, "PDF1");
    }

    #[test]
    fn test_non_attachments_ignored() {
        let children = vec![note("N1"), attachment("OTH", "application/epub+zip")];
        let best = select_from_children(&children).unwrap();
        assert_eq!(best.key, "OTH");

        assert!(select_from_children(&[note("N1")]).is_none());
        assert!(select_from_children(&[]).is_none());
    }
}
