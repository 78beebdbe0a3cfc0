use crate::Card;
use chrono::{DateTime, Utc};

/// Cards carrying at least one of `selected`. An empty selection keeps everything.
pub fn filter_by_tags<'a>(cards: &'a [Card], selected: &[String]) -> Vec<&'a Card> {
    cards
        .iter()
        .filter(|c| selected.is_empty() || c.tags.iter().any(|t| selected.contains(t)))
        .collect()
}

pub fn filter_due(cards: &[Card], now: DateTime<Utc>) -> Vec<&Card> {
    cards.iter().filter(|c| c.is_due(now)).collect()
}

pub fn filter_by_text<'a>(cards: &'a [Card], query: &str) -> Vec<&'a Card> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return cards.iter().collect();
    }
    cards
        .iter()
        .filter(|c| {
            c.front.to_lowercase().contains(&q)
                || c.back.to_lowercase().contains(&q)
                || c.tags.iter().any(|t| t.to_lowercase().contains(&q))
        })
        .collect()
}

/// Distinct tags in first-seen order.
pub fn all_tags(cards: &[Card]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tag in cards.iter().flat_map(|c| c.tags.iter()) {
        if !out.contains(tag) {
            out.push(tag.clone());
        }
    }
    out
}
