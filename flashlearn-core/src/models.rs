use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type CardId = String;

pub const DIFFICULTY_MIN: f64 = 1.0;
pub const DIFFICULTY_MAX: f64 = 5.0;
pub const DIFFICULTY_DEFAULT: f64 = 2.5;

/// Cards at or above this difficulty count as mastered in the stats view.
pub const MASTERED_THRESHOLD: f64 = 4.5;

pub fn new_card_id() -> CardId {
    Uuid::new_v4().to_string()
}

/// Timestamps are stored at millisecond precision; anything finer would not
/// survive a save/load cycle.
pub fn to_millis_precision(t: DateTime<Utc>) -> DateTime<Utc> {
    t.trunc_subsecs(3)
}

pub fn clamp_difficulty(x: f64) -> f64 {
    if x.is_nan() {
        return DIFFICULTY_DEFAULT;
    }
    x.clamp(DIFFICULTY_MIN, DIFFICULTY_MAX)
}

/// A single question/answer study unit with its scheduling metadata.
///
/// The serialized form is flat camelCase JSON with epoch-millisecond
/// timestamps, so collections exported by the browser build load unchanged.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    pub front: String,
    pub back: String,
    pub tags: Vec<String>,

    pub difficulty: f64,
    #[serde(with = "millis_or_zero")]
    pub last_reviewed: Option<DateTime<Utc>>,
    #[serde(with = "millis")]
    pub next_review: DateTime<Utc>,
    pub review_count: u32,
    pub correct_count: u32,
    pub incorrect_count: u32,

    #[serde(with = "millis")]
    pub created_at: DateTime<Utc>,
}

impl Card {
    /// A fresh card, due immediately.
    pub fn new(front: impl Into<String>, back: impl Into<String>, now: DateTime<Utc>) -> Self {
        let now = to_millis_precision(now);
        Self {
            id: new_card_id(),
            front: front.into(),
            back: back.into(),
            tags: Vec::new(),
            difficulty: DIFFICULTY_DEFAULT,
            last_reviewed: None,
            next_review: now,
            review_count: 0,
            correct_count: 0,
            incorrect_count: 0,
            created_at: now,
        }
    }

    pub fn is_new(&self) -> bool {
        self.review_count == 0
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review <= now
    }

    pub fn is_mastered(&self) -> bool {
        self.difficulty >= MASTERED_THRESHOLD
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn counters_consistent(&self) -> bool {
        self.correct_count.saturating_add(self.incorrect_count) == self.review_count
    }

    /// Clamps difficulty into range and resets `review_count` to
    /// `correct + incorrect` when they disagree. Returns whether anything
    /// changed.
    pub fn normalize(&mut self) -> bool {
        let mut changed = false;
        let difficulty = clamp_difficulty(self.difficulty);
        if difficulty != self.difficulty {
            log::warn!("card {}: difficulty {} out of range, using {difficulty}", self.id, self.difficulty);
            self.difficulty = difficulty;
            changed = true;
        }
        if !self.counters_consistent() {
            let answered = self.correct_count.saturating_add(self.incorrect_count);
            log::warn!(
                "card {}: review count {} disagrees with {} correct + {} incorrect, using the sum",
                self.id,
                self.review_count,
                self.correct_count,
                self.incorrect_count
            );
            self.review_count = answered;
            changed = true;
        }
        changed
    }
}

/// Epoch milliseconds. Fractional input is truncated; the browser build
/// occasionally wrote `Date.now() + Math.random()`.
pub(crate) mod millis {
    use chrono::{DateTime, TimeZone, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i64(dt.timestamp_millis())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = f64::deserialize(d)?;
        from_millis(raw).ok_or_else(|| de::Error::custom("timestamp out of range"))
    }

    pub fn from_millis(raw: f64) -> Option<DateTime<Utc>> {
        if !raw.is_finite() {
            return None;
        }
        Utc.timestamp_millis_opt(raw.trunc() as i64).single()
    }
}

/// Like [`millis`], with `0` standing for "never".
pub(crate) mod millis_or_zero {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i64(dt.map(|d| d.timestamp_millis()).unwrap_or(0))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw = f64::deserialize(d)?;
        from_millis(raw).ok_or_else(|| de::Error::custom("timestamp out of range"))
    }

    pub fn from_millis(raw: f64) -> Option<Option<DateTime<Utc>>> {
        if raw == 0.0 {
            Some(None)
        } else {
            super::millis::from_millis(raw).map(Some)
        }
    }
}
