use crate::{apply_outcome, filter_by_tags, Card, CardCollection, CardId, ScheduleOutcome};
use chrono::{DateTime, Utc};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing due under the current filter.
    Idle,
    /// Question side showing.
    Presenting,
    /// Answer side showing.
    Revealed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// Due cards carrying a selected tag (or any card when none is selected),
/// earliest `next_review` first. The sort is stable, so ties keep
/// collection order.
pub fn build_queue<'a>(cards: &'a [Card], selected_tags: &[String], now: DateTime<Utc>) -> Vec<&'a Card> {
    let mut queue: Vec<&Card> = filter_by_tags(cards, selected_tags)
        .into_iter()
        .filter(|c| c.is_due(now))
        .collect();
    queue.sort_by_key(|c| c.next_review);
    queue
}

/// Cursor and flip state over a queue of card ids.
///
/// The session never owns card data. Recording an outcome writes the
/// updated card back into the [`CardCollection`] but leaves the queue as it
/// was, so the answered card keeps its slot until the next rebuild.
#[derive(Clone, Debug, Default)]
pub struct ReviewSession {
    queue: Vec<CardId>,
    cursor: usize,
    flipped: bool,
    selected_tags: Vec<String>,
}

impl ReviewSession {
    pub fn start(cards: &[Card], selected_tags: Vec<String>, now: DateTime<Utc>) -> Self {
        let mut session = Self {
            selected_tags,
            ..Self::default()
        };
        session.rebuild(cards, now);
        session
    }

    /// Recomputes the queue from scratch. The cursor index is kept and
    /// clamped to the new bounds.
    pub fn rebuild(&mut self, cards: &[Card], now: DateTime<Utc>) {
        self.queue = build_queue(cards, &self.selected_tags, now)
            .into_iter()
            .map(|c| c.id.clone())
            .collect();
        self.cursor = self.cursor.min(self.queue.len().saturating_sub(1));
        self.flipped = false;
        log::debug!("review queue rebuilt: {} due", self.queue.len());
    }

    pub fn toggle_tag(&mut self, tag: &str, cards: &[Card], now: DateTime<Utc>) {
        if let Some(idx) = self.selected_tags.iter().position(|t| t == tag) {
            self.selected_tags.remove(idx);
        } else {
            self.selected_tags.push(tag.to_string());
        }
        self.rebuild(cards, now);
    }

    pub fn selected_tags(&self) -> &[String] {
        &self.selected_tags
    }

    pub fn queue(&self) -> &[CardId] {
        &self.queue
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    pub fn is_at_end(&self) -> bool {
        self.cursor + 1 >= self.queue.len()
    }

    pub fn state(&self) -> SessionState {
        if self.queue.is_empty() {
            SessionState::Idle
        } else if self.flipped {
            SessionState::Revealed
        } else {
            SessionState::Presenting
        }
    }

    pub fn current_id(&self) -> Option<&str> {
        self.queue.get(self.cursor).map(String::as_str)
    }

    pub fn current<'a>(&self, collection: &'a CardCollection) -> Option<&'a Card> {
        self.current_id().and_then(|id| collection.get(id))
    }

    /// 1-based position and queue length, for "card i of n".
    pub fn position(&self) -> Option<(usize, usize)> {
        if self.queue.is_empty() {
            None
        } else {
            Some((self.cursor + 1, self.queue.len()))
        }
    }

    pub fn flip(&mut self) {
        if self.queue.is_empty() {
            return;
        }
        self.flipped = !self.flipped;
    }

    /// Saturating move; never wraps around.
    pub fn advance(&mut self, direction: Direction) {
        let last = self.queue.len().saturating_sub(1);
        self.cursor = match direction {
            Direction::Next => (self.cursor + 1).min(last),
            Direction::Previous => self.cursor.saturating_sub(1),
        };
        self.flipped = false;
    }

    /// Applies the scheduler to the current card and writes the result back
    /// into `collection`. Does not move the cursor. Returns `None` when the
    /// queue is empty or the card has since left the collection.
    pub fn record_outcome(
        &mut self,
        collection: &mut CardCollection,
        was_correct: bool,
        now: DateTime<Utc>,
    ) -> Option<ScheduleOutcome> {
        let card = self.current(collection)?.clone();
        let outcome = apply_outcome(card, was_correct, now);
        if collection.replace(outcome.updated_card.clone()).is_err() {
            return None;
        }
        self.flipped = false;
        log::debug!(
            "card {} answered {}, difficulty {:.1}, next in {}d",
            outcome.updated_card.id,
            if was_correct { "correct" } else { "incorrect" },
            outcome.next.difficulty,
            outcome.next.wait_days
        );
        Some(outcome)
    }
}
