//! Read-only access to Zotero's local SQLite database.
//!
//! Annotations are read directly from zotero.sqlite because the local API
//! does not expose them. The connection is opened read-only with `nolock=1`
//! so this reader never blocks, and is never blocked by, the running Zotero
//! application.

use crate::error::{Result, ZoteroError};
use crate::locator::DatabaseLocator;
use once_cell::unsync::OnceCell;
use rusqlite::{params, Connection, OpenFlags};
use std::path::{Path, PathBuf};

/// Read-only reader for Zotero's local database.
///
/// The connection is opened lazily on first query and cached. [`close`]
/// (Self::close) is idempotent; dropping the reader closes the connection.
/// A reader is not meant to be shared across concurrent callers — give each
/// logical session its own instance.
pub struct LocalDatabase {
    db_path: PathBuf,
    conn: OnceCell<Connection>,
}

impl LocalDatabase {
    /// Create a reader for a known database path. No I/O happens until the
    /// first query.
    pub fn open(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            conn: OnceCell::new(),
        }
    }

    /// Locate the database from the environment and create a reader for it.
    pub fn discover() -> Result<Self> {
        Ok(Self::open(DatabaseLocator::from_env().locate()?))
    }

    /// Locate the database with an explicit locator and create a reader.
    pub fn discover_with(locator: &DatabaseLocator) -> Result<Self> {
        Ok(Self::open(locator.locate()?))
    }

    /// Path of the database file this reader is bound to.
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// The Zotero data directory (parent of the database file).
    pub fn data_directory(&self) -> &Path {
        self.db_path.parent().unwrap_or(Path::new("."))
    }

    /// Lazily open the cached read-only connection.
    fn conn(&self) -> Result<&Connection> {
        self.conn.get_or_try_init(|| {
            let uri = format!("file:{}?mode=ro&nolock=1", self.db_path.display());
            let conn = Connection::open_with_flags(
                uri,
                OpenFlags::SQLITE_OPEN_READ_ONLY
                    | OpenFlags::SQLITE_OPEN_URI
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?;
            Ok(conn)
        })
    }

    /// Close the cached connection. Safe to call repeatedly; a later query
    /// reopens the connection.
    pub fn close(&mut self) {
        let _ = self.conn.take();
    }

    /// Resolve a `storage:<key>/<name>` reference to a filesystem path.
    ///
    /// Returns `None` for any other prefix or when the target file does not
    /// exist — storage entries point at files the user may have moved or
    /// deleted, so absence is not an error.
    pub fn resolve_storage_path(&self, storage_ref: &str) -> Option<PathBuf> {
        let rel_path = storage_ref.strip_prefix("storage:")?;
        let resolved = self.data_directory().join("storage").join(rel_path);
        resolved.exists().then_some(resolved)
    }

    /// All PDF annotations of one item, in reading order.
    ///
    /// Joins annotation -> owning attachment -> parent item, keeps only PDF
    /// attachments, and skips saved web snapshots (they are not readable
    /// highlight sources).
    pub fn annotations_for_item(&self, item_key: &str) -> Result<Vec<crate::types::Annotation>> {
        let conn = self.conn()?;

        let sql = "
        SELECT
            ia.type,
            ia.text,
            ia.comment,
            ia.color,
            ia.pageLabel,
            iatt.path AS attachmentPath
        FROM itemAnnotations ia
        JOIN items att ON ia.parentItemID = att.itemID
        JOIN itemAttachments iatt ON att.itemID = iatt.itemID
        JOIN items parent ON iatt.parentItemID = parent.itemID
        WHERE parent.key = ?1
          AND iatt.contentType = 'application/pdf'
          AND (iatt.path IS NULL OR iatt.path NOT LIKE '%snapshot%')
        ORDER BY att.itemID, ia.sortIndex
        ";

        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params![item_key], |row| {
            let raw_type: rusqlite::types::Value = row.get(0)?;
            let path: Option<String> = row.get(5)?;
            Ok(crate::types::Annotation {
                annotation_type: decode_annotation_type(&raw_type),
                text: row.get(1)?,
                comment: row.get(2)?,
                color: row.get(3)?,
                page_label: row.get(4)?,
                attachment_name: path.as_deref().and_then(attachment_display_name),
                parent_key: None,
                parent_title: None,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(ZoteroError::from)
    }

    /// Search all PDF annotations in the library by keyword.
    ///
    /// Matches the highlighted text or the comment, case-insensitively.
    /// Results carry the owning item's key and title; the caller detects
    /// "more results exist" by checking `result.len() >= limit`.
    pub fn search_annotations(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<crate::types::Annotation>> {
        if query.trim().is_empty() {
            return Err(ZoteroError::InvalidQuery(
                "annotation search query cannot be empty".to_string(),
            ));
        }

        let conn = self.conn()?;
        let pattern = format!("%{}%", query);

        let sql = "
        SELECT
            ia.type,
            ia.text,
            ia.comment,
            ia.color,
            ia.pageLabel,
            iatt.path AS attachmentPath,
            parent.key AS parentKey,
            (SELECT value FROM itemData id
             JOIN itemDataValues idv ON id.valueID = idv.valueID
             JOIN fields f ON id.fieldID = f.fieldID
             WHERE id.itemID = parent.itemID AND f.fieldName = 'title'
            ) AS parentTitle
        FROM itemAnnotations ia
        JOIN items att ON ia.parentItemID = att.itemID
        JOIN itemAttachments iatt ON att.itemID = iatt.itemID
        JOIN items parent ON iatt.parentItemID = parent.itemID
        WHERE (ia.text LIKE ?1 OR ia.comment LIKE ?1)
          AND iatt.contentType = 'application/pdf'
        ORDER BY parent.itemID, ia.sortIndex
        LIMIT ?2
        ";

        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params![pattern, limit], |row| {
            let raw_type: rusqlite::types::Value = row.get(0)?;
            let path: Option<String> = row.get(5)?;
            Ok(crate::types::Annotation {
                annotation_type: decode_annotation_type(&raw_type),
                text: row.get(1)?,
                comment: row.get(2)?,
                color: row.get(3)?,
                page_label: row.get(4)?,
                attachment_name: path.as_deref().and_then(attachment_display_name),
                parent_key: row.get(6)?,
                parent_title: row.get(7)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(ZoteroError::from)
    }
}

/// Decode the stored annotation type to its string label.
///
/// Unknown integer codes fall back to "highlight": it is the dominant type,
/// and a mislabeled annotation is less harmful than a dropped one. String
/// values pass through unchanged.
fn decode_annotation_type(raw: &rusqlite::types::Value) -> String {
    use rusqlite::types::Value;
    match raw {
        Value::Integer(code) => match *code {
            1 => "highlight",
            2 => "note",
            3 => "image",
            4 => "ink",
            5 => "underline",
            6 => "text",
            _ => "highlight",
        }
        .to_string(),
        Value::Text(s) => s.clone(),
        _ => "highlight".to_string(),
    }
}

/// Derive a display name from a `storage:<key>/<name>` attachment path.
fn attachment_display_name(path: &str) -> Option<String> {
    let rel = path.strip_prefix("storage:")?;
    rel.rsplit('/').next().filter(|n| !n.is_empty()).map(String::from)
}
