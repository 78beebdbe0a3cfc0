use crate::{Card, CardCollection, CoreError};
use async_trait::async_trait;

pub mod memory;

pub use memory::MemoryStore;

/// Persistence for the whole card collection as a single entry.
///
/// `load` is fail-soft: a missing or unreadable entry comes back as an empty
/// collection. Only I/O failures surface as errors.
#[async_trait]
pub trait CardStore: Send + Sync {
    async fn load(&self) -> Result<Vec<Card>, CoreError>;
    async fn save(&self, cards: &[Card]) -> Result<(), CoreError>;
}

pub async fn load_collection<S: CardStore + ?Sized>(store: &S) -> Result<CardCollection, CoreError> {
    let cards = store.load().await?;
    log::debug!("loaded {} cards", cards.len());
    Ok(CardCollection::from_cards(cards))
}

pub async fn save_collection<S: CardStore + ?Sized>(
    store: &S,
    collection: &CardCollection,
) -> Result<(), CoreError> {
    store.save(collection.cards()).await
}
