//! # zotero-client
//!
//! A Rust client for the Zotero desktop application's local surfaces.
//!
//! Zotero exposes three heterogeneous local interfaces, and this crate
//! combines them into one consistent view:
//! - **Local API** (read): item/collection/tag search and listing
//! - **Connector API** (write): note creation and a liveness probe
//! - **zotero.sqlite** (read-only): direct PDF-annotation access, which the
//!   HTTP APIs do not expose
//!
//! On top of the data access sit the pure transformation layers: attachment
//! selection, metadata summaries, BibTeX generation, and the review-note
//! template engine.
//!
//! ## Quick Start
//!
//! ```no_run
//! # async fn example() -> zotero_client::error::Result<()> {
//! use zotero_client::{LocalDatabase, ZoteroClient};
//!
//! // Reads and writes via the running Zotero application.
//! let client = ZoteroClient::from_env()?;
//! let items = client.search_items("dark matter", 10).await?;
//! for item in &items {
//!     println!("{} [{}]", item.title(), item.key);
//! }
//!
//! // Annotations straight from the local database.
//! let db = LocalDatabase::discover()?;
//! for annotation in db.search_annotations("entropy", 50)? {
//!     println!(
//!         "{}: {:?}",
//!         annotation.parent_title.as_deref().unwrap_or("Untitled"),
//!         annotation.text
//!     );
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Degradation
//!
//! The three sources fail independently. A missing database never blocks the
//! HTTP reads, an unreachable Zotero is a typed error with a remediation
//! hint, and combined views ([`ZoteroClient::item_children_view`]) degrade
//! field-by-field instead of failing wholesale.

pub mod attachments;
pub mod bibtex;
pub mod client;
pub mod collections;
pub mod config;
pub mod connector;
pub mod error;
pub mod format;
pub mod items;
pub mod local_db;
pub mod locator;
pub mod template;
pub mod types;

// Re-export key types at the crate root.
pub use bibtex::generate_bibtex;
pub use client::ZoteroClient;
pub use config::ZoteroConfig;
pub use error::ZoteroError;
pub use local_db::LocalDatabase;
pub use locator::DatabaseLocator;
pub use types::*;
