pub mod cache;
pub mod config;
pub mod error;
pub mod json_bridge;
pub mod schema;
pub mod store;

use std::env;
use std::path::{Path, PathBuf};

pub use cache::SnapshotCache;
pub use config::Settings;
pub use error::{Result, StoreError};
pub use json_bridge::{parse_items, read_items, read_report, report_to_json, write_report};
pub use store::{Snapshot, SnapshotRecord, SnapshotStore};

/// Default base directory for all nd storage.
pub fn default_base_dir() -> PathBuf {
    dirs_home().join(".narrative-detect")
}

fn dirs_home() -> PathBuf {
    env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Snapshot database location under a base directory.
pub fn snapshot_db_path(base: &Path) -> PathBuf {
    base.join("snapshots.db")
}

/// Open (creating directories as needed) the snapshot store under `base`.
pub fn open_store(base: &Path) -> Result<SnapshotStore> {
    std::fs::create_dir_all(base)?;
    SnapshotStore::open(&snapshot_db_path(base))
}
