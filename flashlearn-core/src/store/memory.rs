use crate::{decode_collection, encode_collection, Card, CoreError, COLLECTION_KEY};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

/// In-process key-value store holding the serialized collection, the same
/// shape the file and database backends persist.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the collection entry with raw text, e.g. to simulate a
    /// corrupted store.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        let store = Self::new();
        store.entries.write().insert(COLLECTION_KEY.to_string(), raw.into());
        store
    }

    pub fn raw(&self) -> Option<String> {
        self.entries.read().get(COLLECTION_KEY).cloned()
    }
}

#[async_trait]
impl crate::store::CardStore for MemoryStore {
    async fn load(&self) -> Result<Vec<Card>, CoreError> {
        Ok(self
            .entries
            .read()
            .get(COLLECTION_KEY)
            .map(|raw| decode_collection(raw))
            .unwrap_or_default())
    }

    async fn save(&self, cards: &[Card]) -> Result<(), CoreError> {
        let raw = encode_collection(cards)?;
        self.entries.write().insert(COLLECTION_KEY.to_string(), raw);
        Ok(())
    }
}
