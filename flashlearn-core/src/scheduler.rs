use crate::{clamp_difficulty, to_millis_precision, Card, DIFFICULTY_MAX, DIFFICULTY_MIN};
use chrono::{DateTime, Duration, Utc};

pub const DIFFICULTY_STEP: f64 = 0.5;

/// Wait in days, indexed by `floor(difficulty) - 1`. Difficulty 5 and
/// anything past the end share the last box.
pub const INTERVAL_DAYS: [i64; 5] = [1, 3, 7, 14, 30];

pub const MILLIS_PER_DAY: i64 = 86_400_000;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NextState {
    pub difficulty: f64,
    pub wait_days: i64,
}

impl NextState {
    pub fn wait(&self) -> Duration {
        Duration::days(self.wait_days)
    }

    pub fn wait_millis(&self) -> i64 {
        self.wait_days * MILLIS_PER_DAY
    }
}

fn interval_index(difficulty: f64) -> usize {
    let idx = difficulty.floor() as i64 - 1;
    idx.clamp(0, INTERVAL_DAYS.len() as i64 - 1) as usize
}

/// Leitner-style box step: the difficulty moves half a point and the
/// interval only changes when it crosses an integer boundary.
pub fn compute_next_state(difficulty: f64, was_correct: bool) -> NextState {
    let difficulty = if was_correct {
        (difficulty + DIFFICULTY_STEP).min(DIFFICULTY_MAX)
    } else {
        (difficulty - DIFFICULTY_STEP).max(DIFFICULTY_MIN)
    };
    NextState {
        difficulty,
        wait_days: INTERVAL_DAYS[interval_index(difficulty)],
    }
}

#[derive(Clone, Debug)]
pub struct ScheduleOutcome {
    pub updated_card: Card,
    pub next: NextState,
}

pub fn apply_outcome(mut card: Card, was_correct: bool, now: DateTime<Utc>) -> ScheduleOutcome {
    let next = compute_next_state(clamp_difficulty(card.difficulty), was_correct);
    let now = to_millis_precision(now);

    card.difficulty = next.difficulty;
    card.last_reviewed = Some(now);
    card.next_review = now + next.wait();
    card.review_count = card.review_count.saturating_add(1);
    if was_correct {
        card.correct_count = card.correct_count.saturating_add(1);
    } else {
        card.incorrect_count = card.incorrect_count.saturating_add(1);
    }

    ScheduleOutcome { updated_card: card, next }
}
