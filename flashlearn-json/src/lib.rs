use async_trait::async_trait;
use flashlearn_core::{decode_collection, Card, CardStore, CoreError};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::task;

pub mod paths;

pub const DEFAULT_MAX_BACKUPS: usize = 10;

/// The collection as one pretty-printed JSON array on disk. Every save
/// replaces the file atomically and drops a timestamped copy into the
/// backups directory, keeping the newest `max_backups`.
pub struct JsonStore {
    path: PathBuf,
    backups_dir: PathBuf,
    max_backups: usize,
}

impl JsonStore {
    pub fn open_default() -> Result<Self, CoreError> {
        let (file, backups) = paths::default_store_file();
        Self::open_with(file, backups, DEFAULT_MAX_BACKUPS)
    }

    pub fn open_in(root: &Path) -> Result<Self, CoreError> {
        let (file, backups) = paths::store_files_in(root);
        Self::open_with(file, backups, DEFAULT_MAX_BACKUPS)
    }

    pub fn open_with(path: PathBuf, backups_dir: PathBuf, max_backups: usize) -> Result<Self, CoreError> {
        ensure_parent_dirs(&path)?;
        ensure_dir(&backups_dir)?;
        Ok(Self {
            path,
            backups_dir,
            max_backups: max_backups.max(1),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backups_dir(&self) -> &Path {
        &self.backups_dir
    }
}

fn ensure_parent_dirs(path: &Path) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    Ok(())
}

fn ensure_dir(path: &Path) -> Result<(), CoreError> {
    fs::create_dir_all(path).map_err(|e| io_error(path, e))
}

fn io_error(path: &Path, e: std::io::Error) -> CoreError {
    log::error!("{}: {e}", path.display());
    CoreError::Storage("io")
}

fn read_entry(path: &Path) -> Result<Option<String>, std::io::Error> {
    match fs::read_to_string(path) {
        Ok(raw) => Ok(Some(raw)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

fn write_with_backup(path: &Path, backups_dir: &Path, max_backups: usize, json: &[u8]) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::create_dir_all(backups_dir)?;

    let mut tmp = NamedTempFile::new_in(path.parent().unwrap_or_else(|| Path::new(".")))?;
    tmp.write_all(json)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;

    let ts = chrono::Local::now().format("%Y%m%d-%H%M%S%.3f");
    let backup_path = backups_dir.join(format!("flashlearn-{ts}.json"));
    let mut btmp = NamedTempFile::new_in(backups_dir)?;
    btmp.write_all(json)?;
    btmp.flush()?;
    btmp.persist(&backup_path).map_err(|e| e.error)?;

    rotate_backups(backups_dir, max_backups)
}

fn rotate_backups(dir: &Path, keep: usize) -> Result<(), std::io::Error> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("json"))
        .collect();
    // Names embed the timestamp, so lexical order is age order.
    entries.sort();
    if entries.len() > keep {
        for p in &entries[0..entries.len() - keep] {
            let _ = fs::remove_file(p);
        }
    }
    Ok(())
}

#[async_trait]
impl CardStore for JsonStore {
    async fn load(&self) -> Result<Vec<Card>, CoreError> {
        let p = self.path.clone();
        let raw = task::spawn_blocking(move || read_entry(&p))
            .await
            .map_err(|_| CoreError::Storage("io"))?
            .map_err(|e| io_error(&self.path, e))?;
        Ok(raw.map(|r| decode_collection(&r)).unwrap_or_default())
    }

    async fn save(&self, cards: &[Card]) -> Result<(), CoreError> {
        let json = serde_json::to_vec_pretty(cards).map_err(|_| CoreError::Storage("serialize"))?;
        let path = self.path.clone();
        let backups = self.backups_dir.clone();
        let keep = self.max_backups;

        // Join error -> CoreError, inner io::Error -> CoreError
        task::spawn_blocking(move || write_with_backup(&path, &backups, keep, &json))
            .await
            .map_err(|_| CoreError::Storage("io"))?
            .map_err(|e| io_error(&self.path, e))?;
        log::debug!("saved {} cards to {}", cards.len(), self.path.display());
        Ok(())
    }
}
