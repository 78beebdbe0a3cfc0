use directories::ProjectDirs;
use std::path::{Path, PathBuf};

pub const STORE_FILE_NAME: &str = "flashlearn-cards.json";

pub fn data_root() -> PathBuf {
    if let Some(pd) = ProjectDirs::from("com", "flashlearn", "FlashLearn") {
        pd.data_dir().to_path_buf()
    } else {
        // Fallback: current dir
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    }
}

/// Store file and backups directory under `root`.
pub fn store_files_in(root: &Path) -> (PathBuf, PathBuf) {
    (root.join(STORE_FILE_NAME), root.join("backups"))
}

pub fn default_store_file() -> (PathBuf, PathBuf) {
    store_files_in(&data_root())
}
