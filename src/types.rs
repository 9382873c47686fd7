//! Public types for the Zotero client.
//!
//! Mirrors the JSON shapes of the Zotero local API plus the annotation rows
//! read from the local database. Unknown item-data fields are preserved in an
//! untyped extension map so newer Zotero versions do not break deserialization.

use serde::{Deserialize, Deserializer, Serialize};

/// A bibliographic item (paper, book, note, attachment, ...) as returned by
/// the Zotero API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    /// Opaque item key, stable within the library.
    pub key: String,
    /// Library version the item was last modified at.
    #[serde(default)]
    pub version: Option<u64>,
    /// API-side metadata (child counts etc.).
    #[serde(default)]
    pub meta: Option<ItemMeta>,
    /// The item's typed field data.
    pub data: ItemData,
}

impl Item {
    /// Item title, or "Untitled" when absent.
    pub fn title(&self) -> &str {
        self.data.title.as_deref().unwrap_or("Untitled")
    }

    /// Number of child items (attachments and notes) reported by the API.
    pub fn num_children(&self) -> u64 {
        self.meta
            .as_ref()
            .and_then(|m| m.num_children)
            .unwrap_or(0)
    }
}

/// API metadata attached to an item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemMeta {
    #[serde(rename = "numChildren", default)]
    pub num_children: Option<u64>,
}

/// The `data` block of a Zotero item.
///
/// The commonly used fields are typed; everything else the API sends lands in
/// [`extra`](Self::extra).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemData {
    #[serde(rename = "itemType", default)]
    pub item_type: ItemType,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(rename = "DOI", default)]
    pub doi: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub place: Option<String>,
    #[serde(rename = "publicationTitle", default)]
    pub publication_title: Option<String>,
    #[serde(default)]
    pub volume: Option<String>,
    #[serde(default)]
    pub issue: Option<String>,
    #[serde(default)]
    pub pages: Option<String>,
    #[serde(rename = "abstractNote", default)]
    pub abstract_note: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(rename = "contentType", default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(rename = "parentItem", default)]
    pub parent_item: Option<String>,
    #[serde(default)]
    pub creators: Vec<Creator>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub collections: Vec<String>,
    /// Fields this crate does not model explicitly.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Enumerated Zotero item types, with an escape hatch for types this crate
/// does not know about.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ItemType {
    JournalArticle,
    Book,
    BookSection,
    ConferencePaper,
    Thesis,
    Report,
    Webpage,
    Manuscript,
    Attachment,
    Note,
    #[default]
    Unknown,
    Other(String),
}

impl ItemType {
    /// The API string for this item type.
    pub fn as_str(&self) -> &str {
        match self {
            Self::JournalArticle => "journalArticle",
            Self::Book => "book",
            Self::BookSection => "bookSection",
            Self::ConferencePaper => "conferencePaper",
            Self::Thesis => "thesis",
            Self::Report => "report",
            Self::Webpage => "webpage",
            Self::Manuscript => "manuscript",
            Self::Attachment => "attachment",
            Self::Note => "note",
            Self::Unknown => "unknown",
            Self::Other(s) => s,
        }
    }

    /// Parse an API item-type string.
    pub fn from_api_str(s: &str) -> Self {
        match s {
            "journalArticle" => Self::JournalArticle,
            "book" => Self::Book,
            "bookSection" => Self::BookSection,
            "conferencePaper" => Self::ConferencePaper,
            "thesis" => Self::Thesis,
            "report" => Self::Report,
            "webpage" => Self::Webpage,
            "manuscript" => Self::Manuscript,
            "attachment" => Self::Attachment,
            "note" => Self::Note,
            "unknown" | "" => Self::Unknown,
            other => Self::Other(other.to_string()),
        }
    }

    /// Whether this type carries no bibliographic identity of its own.
    pub fn is_non_bibliographic(&self) -> bool {
        matches!(self, Self::Attachment | Self::Note)
    }
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ItemType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ItemType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from_api_str(&s))
    }
}

/// A creator entry: role plus either a first/last pair or a single
/// organizational name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Creator {
    #[serde(rename = "creatorType", default)]
    pub creator_type: Option<String>,
    #[serde(rename = "firstName", default)]
    pub first_name: Option<String>,
    #[serde(rename = "lastName", default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl Creator {
    /// Whether this creator has the "author" role.
    pub fn is_author(&self) -> bool {
        self.creator_type.as_deref() == Some("author")
    }
}

/// A tag attached to an item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub tag: String,
}

/// A collection (folder) in the library.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    pub key: String,
    #[serde(default)]
    pub version: Option<u64>,
    pub data: CollectionData,
}

/// The `data` block of a collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionData {
    #[serde(default)]
    pub name: Option<String>,
    /// Parent collection key. The API encodes "no parent" as the JSON value
    /// `false`, so this needs a lenient deserializer.
    #[serde(
        rename = "parentCollection",
        default,
        deserialize_with = "deserialize_parent_collection"
    )]
    pub parent_collection: Option<String>,
}

fn deserialize_parent_collection<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) if !s.is_empty() => Ok(Some(s)),
        _ => Ok(None),
    }
}

/// Details about the attachment chosen for an item.
///
/// A view over an item's own fields or a child item's fields; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentDetails {
    pub key: String,
    pub title: String,
    pub filename: String,
    pub content_type: String,
}

impl AttachmentDetails {
    /// Whether this attachment is eligible for full-text extraction.
    pub fn is_pdf(&self) -> bool {
        self.content_type == "application/pdf"
    }
}

/// A PDF annotation read from the local database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Annotation {
    /// Decoded annotation type: highlight, note, image, ink, underline, text.
    pub annotation_type: String,
    /// Highlighted text, if any.
    pub text: Option<String>,
    /// The user's comment, if any.
    pub comment: Option<String>,
    pub color: Option<String>,
    pub page_label: Option<String>,
    /// Display name of the owning attachment file.
    pub attachment_name: Option<String>,
    /// Key of the owning bibliographic item (library-wide search only).
    pub parent_key: Option<String>,
    /// Title of the owning bibliographic item (library-wide search only).
    pub parent_title: Option<String>,
}

/// Combined view of an item's children across data sources.
#[derive(Debug, Clone, Default)]
pub struct ItemChildren {
    pub attachments: Vec<Item>,
    pub notes: Vec<Item>,
    pub annotations: Vec<Annotation>,
    /// Set when annotation retrieval failed but the rest of the view is
    /// still usable.
    pub annotation_warning: Option<String>,
}

impl ItemChildren {
    pub fn is_empty(&self) -> bool {
        self.attachments.is_empty() && self.notes.is_empty() && self.annotations.is_empty()
    }
}

/// Search scope for item queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryMode {
    /// Match against title, creators, and year (the API default).
    #[default]
    TitleCreatorYear,
    /// Match against full text and note contents as well.
    Everything,
}

impl QueryMode {
    /// The API parameter value.
    pub fn as_api_str(&self) -> &'static str {
        match self {
            Self::TitleCreatorYear => "titleCreatorYear",
            Self::Everything => "everything",
        }
    }
}

/// Sort key for recent-item listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecentSort {
    #[default]
    DateModified,
    DateAdded,
}

impl RecentSort {
    /// The API parameter value.
    pub fn as_api_str(&self) -> &'static str {
        match self {
            Self::DateModified => "dateModified",
            Self::DateAdded => "dateAdded",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_ITEM: &str = r#"{
        "key": "ABCD1234",
        "version": 120,
        "meta": { "numChildren": 2 },
        "data": {
            "key": "ABCD1234",
            "itemType": "journalArticle",
            "title": "Dark Matter Halos",
            "date": "2023-05-01",
            "DOI": "10.1000/xyz",
            "publicationTitle": "ApJ",
            "volume": "950",
            "creators": [
                { "creatorType": "author", "firstName": "Jane", "lastName": "Doe" },
                { "creatorType": "editor", "name": "The Collaboration" }
            ],
            "tags": [{ "tag": "cosmology" }],
            "rights": "CC-BY"
        }
    }"#;

    #[test]
    fn test_item_deserializes_with_extension_fields() {
        let item: Item = serde_json::from_str(SAMPLE_ITEM).unwrap();
        assert_eq!(item.key, "ABCD1234");
        assert_eq!(item.data.item_type, ItemType::JournalArticle);
        assert_eq!(item.title(), "Dark Matter Halos");
        assert_eq!(item.num_children(), 2);
        assert_eq!(item.data.doi.as_deref(), Some("10.1000/xyz"));
        assert_eq!(item.data.creators.len(), 2);
        assert!(item.data.creators[0].is_author());
        assert!(!item.data.creators[1].is_author());
        // Unknown fields survive in the extension map.
        assert_eq!(
            item.data.extra.get("rights").and_then(|v| v.as_str()),
            Some("CC-BY")
        );
    }

    #[test]
    fn test_unknown_item_type_round_trips() {
        let t = ItemType::from_api_str("podcast");
        assert_eq!(t, ItemType::Other("podcast".to_string()));
        assert_eq!(t.as_str(), "podcast");
        assert!(!t.is_non_bibliographic());
        assert!(ItemType::Attachment.is_non_bibliographic());
        assert!(ItemType::Note.is_non_bibliographic());
    }

    #[test]
    fn test_parent_collection_false_is_none() {
        let json = r#"{ "key": "COLL1", "data": { "name": "Root", "parentCollection": false } }"#;
        let coll: Collection = serde_json::from_str(json).unwrap();
        assert!(coll.data.parent_collection.is_none());

        let json = r#"{ "key": "COLL2", "data": { "name": "Child", "parentCollection": "COLL1" } }"#;
        let coll: Collection = serde_json::from_str(json).unwrap();
        assert_eq!(coll.data.parent_collection.as_deref(), Some("COLL1"));
    }

    #[test]
    fn test_attachment_pdf_eligibility() {
        let att = AttachmentDetails {
            key: "K".into(),
            title: "Paper".into(),
            filename: "paper.pdf".into(),
            content_type: "application/pdf".into(),
        };
        assert!(att.is_pdf());
        let html = AttachmentDetails {
            content_type: "text/html".into(),
            ..att
        };
        assert!(!html.is_pdf());
    }
}
