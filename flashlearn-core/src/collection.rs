use crate::{all_tags, new_card_id, Card, CoreError};
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// The application-level card list. Every mutation goes through here; the
/// caller persists [`CardCollection::cards`] through a [`crate::CardStore`]
/// afterwards.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CardCollection {
    cards: Vec<Card>,
}

impl CardCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn into_cards(self) -> Vec<Card> {
        self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut Card, CoreError> {
        self.cards
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(CoreError::NotFound("card"))
    }

    pub fn create(
        &mut self,
        front: &str,
        back: &str,
        tags: &[String],
        now: DateTime<Utc>,
    ) -> Result<&Card, CoreError> {
        let (front, back) = (front.trim(), back.trim());
        if front.is_empty() {
            return Err(CoreError::Invalid("front must not be empty"));
        }
        if back.is_empty() {
            return Err(CoreError::Invalid("back must not be empty"));
        }
        let mut card = Card::new(front, back, now);
        for tag in tags {
            push_tag(&mut card.tags, tag);
        }
        log::debug!("created card {}", card.id);
        self.cards.push(card);
        Ok(&self.cards[self.cards.len() - 1])
    }

    /// Replace-by-id; the card keeps its position in the collection.
    pub fn replace(&mut self, card: Card) -> Result<(), CoreError> {
        let slot = self.get_mut(&card.id)?;
        *slot = card;
        Ok(())
    }

    pub fn edit(&mut self, id: &str, front: Option<&str>, back: Option<&str>) -> Result<&Card, CoreError> {
        let (front, back) = (front.map(str::trim), back.map(str::trim));
        if front.is_some_and(str::is_empty) {
            return Err(CoreError::Invalid("front must not be empty"));
        }
        if back.is_some_and(str::is_empty) {
            return Err(CoreError::Invalid("back must not be empty"));
        }
        let card = self.get_mut(id)?;
        if let Some(f) = front {
            card.front = f.to_string();
        }
        if let Some(b) = back {
            card.back = b.to_string();
        }
        Ok(&*card)
    }

    pub fn delete(&mut self, id: &str) -> Result<Card, CoreError> {
        let idx = self
            .cards
            .iter()
            .position(|c| c.id == id)
            .ok_or(CoreError::NotFound("card"))?;
        Ok(self.cards.remove(idx))
    }

    /// Returns whether the tag was added; blank and duplicate tags are ignored.
    pub fn add_tag(&mut self, id: &str, tag: &str) -> Result<bool, CoreError> {
        let card = self.get_mut(id)?;
        Ok(push_tag(&mut card.tags, tag))
    }

    pub fn remove_tag(&mut self, id: &str, tag: &str) -> Result<bool, CoreError> {
        let card = self.get_mut(id)?;
        let before = card.tags.len();
        card.tags.retain(|t| t != tag.trim());
        Ok(card.tags.len() != before)
    }

    /// Appends cards from an import or generation run. Ids already present
    /// are reassigned so no two cards share one. Returns the number added.
    pub fn merge(&mut self, incoming: Vec<Card>) -> usize {
        let mut seen: HashSet<String> = self.cards.iter().map(|c| c.id.clone()).collect();
        let added = incoming.len();
        for mut card in incoming {
            if !seen.insert(card.id.clone()) {
                let fresh = new_card_id();
                log::warn!("card id {} already in use, reassigned to {}", card.id, fresh);
                card.id = fresh;
                seen.insert(card.id.clone());
            }
            self.cards.push(card);
        }
        added
    }

    pub fn all_tags(&self) -> Vec<String> {
        all_tags(&self.cards)
    }
}

pub(crate) fn push_tag(tags: &mut Vec<String>, tag: &str) -> bool {
    let tag = tag.trim();
    if tag.is_empty() || tags.iter().any(|t| t == tag) {
        return false;
    }
    tags.push(tag.to_string());
    true
}
