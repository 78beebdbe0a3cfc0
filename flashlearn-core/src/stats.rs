use crate::Card;
use chrono::{DateTime, Utc};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatsSummary {
    pub total_cards: u32,
    pub mastered_cards: u32,
    pub reviews_due: u32,
    pub total_reviews: u64,
    pub total_correct: u64,
    /// Whole percent, 0..=100.
    pub accuracy: u32,
}

pub fn accuracy_percent(correct: u64, reviews: u64) -> u32 {
    let pct = correct as f64 / reviews.max(1) as f64 * 100.0;
    pct.round() as u32
}

pub fn summarize(cards: &[Card], now: DateTime<Utc>) -> StatsSummary {
    let mut summary = StatsSummary::default();
    for c in cards {
        summary.total_cards += 1;
        if c.is_mastered() {
            summary.mastered_cards += 1;
        }
        if c.is_due(now) {
            summary.reviews_due += 1;
        }
        summary.total_reviews += u64::from(c.review_count);
        summary.total_correct += u64::from(c.correct_count);
    }
    if summary.total_cards > 0 {
        summary.accuracy = accuracy_percent(summary.total_correct, summary.total_reviews);
    }
    summary
}
