//! JSON import/export of card collections, and the codec the stores use for
//! the persisted entry.

use crate::models::{millis, millis_or_zero};
use crate::collection::push_tag;
use crate::{new_card_id, to_millis_precision, Card, CoreError, DIFFICULTY_DEFAULT};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// Key of the single entry holding the whole collection.
pub const COLLECTION_KEY: &str = "flashlearn-cards";

/// A partially specified card, as found in import files or generator output.
/// Anything missing is filled in by [`CardDraft::into_card`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CardDraft {
    pub id: Option<String>,
    pub front: Option<String>,
    pub back: Option<String>,
    pub tags: Vec<String>,
    pub difficulty: Option<f64>,
    pub last_reviewed: Option<DateTime<Utc>>,
    pub next_review: Option<DateTime<Utc>>,
    pub review_count: Option<u32>,
    pub correct_count: Option<u32>,
    pub incorrect_count: Option<u32>,
    pub created_at: Option<DateTime<Utc>>,
}

impl CardDraft {
    /// Reads whatever fields are present and well-typed; the rest stay unset.
    pub fn from_object(obj: &Map<String, Value>) -> Self {
        let id = match obj.get("id") {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        let mut tags: Vec<String> = Vec::new();
        for tag in obj.get("tags").and_then(Value::as_array).into_iter().flatten() {
            if let Some(tag) = tag.as_str() {
                push_tag(&mut tags, tag);
            }
        }
        Self {
            id,
            front: string_field(obj, "front"),
            back: string_field(obj, "back"),
            tags,
            difficulty: obj.get("difficulty").and_then(Value::as_f64),
            last_reviewed: obj
                .get("lastReviewed")
                .and_then(Value::as_f64)
                .and_then(millis_or_zero::from_millis)
                .flatten(),
            next_review: time_field(obj, "nextReview"),
            review_count: count_field(obj, "reviewCount"),
            correct_count: count_field(obj, "correctCount"),
            incorrect_count: count_field(obj, "incorrectCount"),
            created_at: time_field(obj, "createdAt"),
        }
    }

    pub fn into_card(self, now: DateTime<Utc>) -> Card {
        let now = to_millis_precision(now);
        let mut card = Card {
            id: self.id.unwrap_or_else(new_card_id),
            front: self.front.unwrap_or_default(),
            back: self.back.unwrap_or_default(),
            tags: self.tags,
            difficulty: self.difficulty.unwrap_or(DIFFICULTY_DEFAULT),
            last_reviewed: self.last_reviewed,
            next_review: self.next_review.unwrap_or(now),
            review_count: self.review_count.unwrap_or(0),
            correct_count: self.correct_count.unwrap_or(0),
            incorrect_count: self.incorrect_count.unwrap_or(0),
            created_at: self.created_at.unwrap_or(now),
        };
        card.normalize();
        card
    }
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

fn time_field(obj: &Map<String, Value>, key: &str) -> Option<DateTime<Utc>> {
    obj.get(key).and_then(Value::as_f64).and_then(millis::from_millis)
}

fn count_field(obj: &Map<String, Value>, key: &str) -> Option<u32> {
    obj.get(key)
        .and_then(Value::as_f64)
        .filter(|n| n.is_finite() && *n >= 0.0)
        .map(|n| n.trunc() as u32)
}

/// Parses user-supplied JSON into cards. Input must be an array; entries
/// that are not objects are skipped. Ids are taken as given, so callers
/// should add the result through [`crate::CardCollection::merge`].
pub fn import_cards(input: &str, now: DateTime<Utc>) -> Result<Vec<Card>, CoreError> {
    let value: Value = serde_json::from_str(input).map_err(|e| CoreError::Malformed(e.to_string()))?;
    let Value::Array(items) = value else {
        return Err(CoreError::Malformed("expected a JSON array of cards".to_string()));
    };
    let mut cards = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        match item.as_object() {
            Some(obj) => cards.push(CardDraft::from_object(obj).into_card(now)),
            None => log::warn!("skipping import entry {i}: not an object"),
        }
    }
    Ok(cards)
}

pub fn export_cards(cards: &[Card]) -> Result<String, CoreError> {
    serde_json::to_string_pretty(cards).map_err(|_| CoreError::Storage("serialize"))
}

pub fn encode_collection(cards: &[Card]) -> Result<String, CoreError> {
    serde_json::to_string(cards).map_err(|_| CoreError::Storage("serialize"))
}

/// Decodes the persisted entry. A corrupt entry yields an empty collection
/// rather than an error so startup always succeeds. Cards that decode but
/// carry an out-of-range difficulty or mismatched counters are repaired.
pub fn decode_collection(raw: &str) -> Vec<Card> {
    match serde_json::from_str::<Vec<Card>>(raw) {
        Ok(mut cards) => {
            let repaired = cards.iter_mut().map(Card::normalize).filter(|r| *r).count();
            if repaired > 0 {
                log::warn!("repaired {repaired} stored card(s) on load");
            }
            cards
        }
        Err(e) => {
            log::warn!("stored collection is unreadable, starting empty: {e}");
            Vec::new()
        }
    }
}
