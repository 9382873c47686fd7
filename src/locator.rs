//! Discovery of the zotero.sqlite database on disk.
//!
//! Explicit overrides are authoritative: if one is set and wrong, locating
//! fails immediately instead of silently falling back to auto-detection.

use crate::config::ZoteroConfig;
use crate::error::{Result, ZoteroError};
use std::path::{Path, PathBuf};
use tracing::debug;

const DB_FILENAME: &str = "zotero.sqlite";

/// Resolves the filesystem path of the Zotero database.
#[derive(Debug, Clone, Default)]
pub struct DatabaseLocator {
    /// Direct path override (`ZOTERO_DATABASE_PATH`).
    pub database_path: Option<PathBuf>,
    /// Data-directory override (`ZOTERO_DATA_DIR`).
    pub data_dir: Option<PathBuf>,
    /// Home directory used for platform candidates.
    home: Option<PathBuf>,
    /// Windows roaming app-data directory.
    appdata: Option<PathBuf>,
}

impl DatabaseLocator {
    /// Build a locator from environment variables and the platform home
    /// directory.
    pub fn from_env() -> Self {
        Self {
            database_path: std::env::var("ZOTERO_DATABASE_PATH")
                .ok()
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
            data_dir: std::env::var("ZOTERO_DATA_DIR")
                .ok()
                .filter(|d| !d.is_empty())
                .map(PathBuf::from),
            home: dirs::home_dir(),
            appdata: std::env::var("APPDATA").ok().map(PathBuf::from),
        }
    }

    /// Build a locator from an already-loaded configuration.
    pub fn from_config(config: &ZoteroConfig) -> Self {
        Self {
            database_path: config.database_path.clone(),
            data_dir: config.data_dir.clone(),
            home: dirs::home_dir(),
            appdata: std::env::var("APPDATA").ok().map(PathBuf::from),
        }
    }

    /// Override the home directory (for tests).
    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }

    /// Resolve the database path.
    ///
    /// Resolution order: direct path override, data-directory override,
    /// platform search. An override that points at nothing fails immediately
    /// and names the responsible variable; the platform search fails with a
    /// message enumerating every candidate it checked.
    pub fn locate(&self) -> Result<PathBuf> {
        if let Some(path) = &self.database_path {
            if path.exists() {
                return Ok(path.clone());
            }
            return Err(ZoteroError::DatabaseNotFound(format!(
                "ZOTERO_DATABASE_PATH set but file not found: {}",
                path.display()
            )));
        }

        if let Some(dir) = &self.data_dir {
            let path = dir.join(DB_FILENAME);
            if path.exists() {
                return Ok(path);
            }
            return Err(ZoteroError::DatabaseNotFound(format!(
                "ZOTERO_DATA_DIR set but database not found: {}",
                path.display()
            )));
        }

        let candidates = self.platform_candidates();
        for candidate in &candidates {
            debug!(candidate = %candidate.display(), "checking database candidate");
            if candidate.exists() {
                return Ok(candidate.clone());
            }
        }

        let searched: Vec<String> = candidates
            .iter()
            .map(|c| format!("  - {}", c.display()))
            .collect();
        Err(ZoteroError::DatabaseNotFound(format!(
            "Zotero database not found. Searched locations:\n{}\n\
             Set ZOTERO_DATA_DIR or ZOTERO_DATABASE_PATH to specify a custom location.",
            searched.join("\n")
        )))
    }

    /// Platform-specific candidate paths, in priority order.
    fn platform_candidates(&self) -> Vec<PathBuf> {
        let mut candidates = Vec::new();

        let Some(home) = &self.home else {
            return candidates;
        };

        // Zotero 7+ default location, all platforms.
        candidates.push(home.join("Zotero").join(DB_FILENAME));

        if cfg!(target_os = "windows") {
            if let Some(appdata) = &self.appdata {
                candidates.push(appdata.join("Zotero").join("Zotero").join(DB_FILENAME));
            }
        } else if cfg!(target_os = "linux") {
            // Zotero 6 and earlier kept the database inside a profile
            // directory, e.g. ~/.zotero/zotero/abc123.default/.
            let profiles = home.join(".zotero").join("zotero");
            if let Ok(entries) = std::fs::read_dir(&profiles) {
                let mut profile_dbs: Vec<PathBuf> = entries
                    .flatten()
                    .filter(|e| e.path().is_dir())
                    .map(|e| e.path().join(DB_FILENAME))
                    .collect();
                profile_dbs.sort();
                candidates.extend(profile_dbs);
            }

            candidates.push(
                home.join("snap")
                    .join("zotero-snap")
                    .join("common")
                    .join("Zotero")
                    .join(DB_FILENAME),
            );
        }
        // macOS uses only the fixed default above.

        candidates
    }
}

/// The Zotero data directory containing a database path.
pub fn data_directory(db_path: &Path) -> &Path {
    db_path.parent().unwrap_or(Path::new("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_database_path_override_is_authoritative() {
        let tmp = TempDir::new().unwrap();
        let db = tmp.path().join(DB_FILENAME);
        touch(&db);

        // Even with a bogus home, the override wins without consulting
        // any other candidate.
        let locator = DatabaseLocator {
            database_path: Some(db.clone()),
            ..Default::default()
        }
        .with_home("/nonexistent-home");
        assert_eq!(locator.locate().unwrap(), db);
    }

    #[test]
    fn test_missing_database_path_override_fails_naming_variable() {
        let tmp = TempDir::new().unwrap();
        // A valid fallback exists, but the override must not fall through.
        touch(&tmp.path().join("Zotero").join(DB_FILENAME));

        let locator = DatabaseLocator {
            database_path: Some(tmp.path().join("missing.sqlite")),
            ..Default::default()
        }
        .with_home(tmp.path());

        let err = locator.locate().unwrap_err();
        assert!(err.to_string().contains("ZOTERO_DATABASE_PATH"));
    }

    #[test]
    fn test_data_dir_override() {
        let tmp = TempDir::new().unwrap();
        let db = tmp.path().join(DB_FILENAME);
        touch(&db);

        let locator = DatabaseLocator {
            data_dir: Some(tmp.path().to_path_buf()),
            ..Default::default()
        };
        assert_eq!(locator.locate().unwrap(), db);
    }

    #[test]
    fn test_missing_data_dir_override_fails_naming_variable() {
        let locator = DatabaseLocator {
            data_dir: Some(PathBuf::from("/nonexistent-dir")),
            ..Default::default()
        };
        let err = locator.locate().unwrap_err();
        assert!(err.to_string().contains("ZOTERO_DATA_DIR"));
    }

    #[test]
    fn test_default_home_candidate() {
        let tmp = TempDir::new().unwrap();
        let db = tmp.path().join("Zotero").join(DB_FILENAME);
        touch(&db);

        let locator = DatabaseLocator::default().with_home(tmp.path());
        assert_eq!(locator.locate().unwrap(), db);
    }

    #[test]
    fn test_not_found_enumerates_candidates() {
        let tmp = TempDir::new().unwrap();
        let locator = DatabaseLocator::default().with_home(tmp.path());

        let err = locator.locate().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Searched locations"));
        assert!(message.contains("Zotero"));
        assert!(message.contains("ZOTERO_DATA_DIR"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_linux_profile_directory_scan() {
        let tmp = TempDir::new().unwrap();
        let profile_db = tmp
            .path()
            .join(".zotero")
            .join("zotero")
            .join("abc123.default")
            .join(DB_FILENAME);
        touch(&profile_db);

        let locator = DatabaseLocator::default().with_home(tmp.path());
        assert_eq!(locator.locate().unwrap(), profile_db);
    }

    #[test]
    fn test_data_directory_of_db_path() {
        assert_eq!(
            data_directory(Path::new("/home/u/Zotero/zotero.sqlite")),
            Path::new("/home/u/Zotero")
        );
    }
}
