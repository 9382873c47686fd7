//! Client configuration.
//!
//! All settings live in one [`ZoteroConfig`] value constructed at startup and
//! handed to each component — there is no ambient global state.

use crate::error::{Result, ZoteroError};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Zotero local API endpoint (read-only).
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:23119/api";
/// Zotero Connector endpoint (write-capable).
pub const DEFAULT_CONNECTOR_URL: &str = "http://127.0.0.1:23119/connector";

/// Configuration for [`ZoteroClient`](crate::ZoteroClient) and the local
/// database reader.
#[derive(Debug, Clone)]
pub struct ZoteroConfig {
    /// Library id for the local API. The always-present local library is "0".
    pub library_id: String,
    /// Library type: `user` or `group`.
    pub library_type: LibraryType,
    /// Library id used by the Connector saveItems endpoint.
    pub connector_library_id: u32,
    /// Base URL of the local read API.
    pub api_base_url: String,
    /// Base URL of the Connector API.
    pub connector_base_url: String,
    /// Timeout applied to every API request.
    pub timeout: Duration,
    /// Timeout for the liveness probe.
    pub ping_timeout: Duration,
    /// Explicit path to zotero.sqlite (overrides discovery).
    pub database_path: Option<PathBuf>,
    /// Explicit Zotero data directory (overrides discovery).
    pub data_dir: Option<PathBuf>,
}

/// Kind of Zotero library a client is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LibraryType {
    #[default]
    User,
    Group,
}

impl LibraryType {
    fn from_str_loose(s: &str) -> Self {
        if s.eq_ignore_ascii_case("group") {
            Self::Group
        } else {
            Self::User
        }
    }

    /// URL path segment for this library type.
    pub fn path_segment(&self) -> &'static str {
        match self {
            Self::User => "users",
            Self::Group => "groups",
        }
    }
}

impl Default for ZoteroConfig {
    fn default() -> Self {
        Self {
            library_id: "0".to_string(),
            library_type: LibraryType::User,
            connector_library_id: 1,
            api_base_url: DEFAULT_API_URL.to_string(),
            connector_base_url: DEFAULT_CONNECTOR_URL.to_string(),
            timeout: Duration::from_secs(10),
            ping_timeout: Duration::from_secs(3),
            database_path: None,
            data_dir: None,
        }
    }
}

impl ZoteroConfig {
    /// Build a configuration from environment variables, falling back to the
    /// local-library defaults for anything unset.
    ///
    /// Recognized variables: `ZOTERO_LIBRARY_ID`, `ZOTERO_LIBRARY_TYPE`,
    /// `ZOTERO_CONNECTOR_LIBRARY_ID`, `ZOTERO_DATABASE_PATH`,
    /// `ZOTERO_DATA_DIR`.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(id) = std::env::var("ZOTERO_LIBRARY_ID") {
            if !id.is_empty() {
                config.library_id = id;
            }
        }
        if let Ok(kind) = std::env::var("ZOTERO_LIBRARY_TYPE") {
            config.library_type = LibraryType::from_str_loose(&kind);
        }
        if let Ok(id) = std::env::var("ZOTERO_CONNECTOR_LIBRARY_ID") {
            if let Ok(parsed) = id.parse() {
                config.connector_library_id = parsed;
            }
        }
        if let Ok(path) = std::env::var("ZOTERO_DATABASE_PATH") {
            if !path.is_empty() {
                config.database_path = Some(PathBuf::from(path));
            }
        }
        if let Ok(dir) = std::env::var("ZOTERO_DATA_DIR") {
            if !dir.is_empty() {
                config.data_dir = Some(PathBuf::from(dir));
            }
        }

        config
    }

    /// Override both base URLs (useful for testing against a stub server).
    pub fn with_base_urls(
        mut self,
        api_url: impl Into<String>,
        connector_url: impl Into<String>,
    ) -> Result<Self> {
        let api_url = api_url.into();
        let connector_url = connector_url.into();
        Url::parse(&api_url).map_err(|e| ZoteroError::Config(format!("invalid API URL: {}", e)))?;
        Url::parse(&connector_url)
            .map_err(|e| ZoteroError::Config(format!("invalid connector URL: {}", e)))?;
        self.api_base_url = api_url;
        self.connector_base_url = connector_url;
        Ok(self)
    }

    /// URL prefix for library-scoped API paths, e.g. `/users/0`.
    pub fn library_prefix(&self) -> String {
        format!("/{}/{}", self.library_type.path_segment(), self.library_id)
    }
}
