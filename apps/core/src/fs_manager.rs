use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Name of the SQLite file holding the counter
pub const DB_FILENAME: &str = "rejection_alarm.sqlite";

pub struct PortablePathManager;

impl PortablePathManager {
    /// Directory of the executable, where the portable data folder lives.
    pub fn root_dir() -> PathBuf {
        match std::env::current_exe() {
            Ok(mut path) => {
                path.pop();
                path
            }
            Err(e) => {
                warn!(
                    "Failed to get current exe path: {}. Falling back to current_dir.",
                    e
                );
                std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
            }
        }
    }

    /// Default data directory (`<exe dir>/data`) when none is configured.
    pub fn default_data_dir() -> PathBuf {
        Self::root_dir().join("data")
    }

    /// Database directory (`<data>/db`).
    pub fn db_dir(data_dir: &Path) -> PathBuf {
        data_dir.join("db")
    }

    /// Path of the counter database file.
    pub fn db_path(data_dir: &Path) -> PathBuf {
        Self::db_dir(data_dir).join(DB_FILENAME)
    }

    /// Create the data and db directories if they do not exist.
    pub fn init(data_dir: &Path) -> Result<(), std::io::Error> {
        let db_path = Self::db_dir(data_dir);

        if !data_dir.exists() {
            info!("Creating data directory: {:?}", data_dir);
            fs::create_dir_all(data_dir)?;
        }

        if !db_path.exists() {
            info!("Creating db directory: {:?}", db_path);
            fs::create_dir_all(&db_path)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_init_creates_tree() {
        let dir = tempdir().expect("Failed to create temp dir");
        let data_dir = dir.path().join("data");

        PortablePathManager::init(&data_dir).expect("init failed");

        assert!(PortablePathManager::db_dir(&data_dir).is_dir());
        assert_eq!(
            PortablePathManager::db_path(&data_dir),
            data_dir.join("db").join(DB_FILENAME)
        );

        // Second call is a no-op
        PortablePathManager::init(&data_dir).expect("re-init failed");
    }
}
