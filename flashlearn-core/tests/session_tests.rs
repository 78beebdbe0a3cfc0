use chrono::{DateTime, Duration, TimeZone, Utc};
use flashlearn_core::{build_queue, Card, CardCollection, Direction, ReviewSession, SessionState};

fn at(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms).unwrap()
}

fn card(front: &str, next_review: DateTime<Utc>, tags: &[&str]) -> Card {
    let mut c = Card::new(front, "back", next_review - Duration::days(30));
    c.next_review = next_review;
    c.tags = tags.iter().map(|t| t.to_string()).collect();
    c
}

fn deck(now: DateTime<Utc>) -> Vec<Card> {
    vec![
        card("later", now + Duration::days(1), &["spanish"]),
        card("two-days-ago", now - Duration::days(2), &["spanish"]),
        card("an-hour-ago", now - Duration::hours(1), &["french"]),
        card("exactly-now", now, &[]),
        card("also-two-days-ago", now - Duration::days(2), &["french", "spanish"]),
    ]
}

fn fronts(queue: &[&Card]) -> Vec<String> {
    queue.iter().map(|c| c.front.clone()).collect()
}

#[test]
fn queue_holds_only_due_cards_in_due_order() {
    let now = at(1_700_000_000_000);
    let cards = deck(now);
    let queue = build_queue(&cards, &[], now);

    assert_eq!(
        fronts(&queue),
        vec!["two-days-ago", "also-two-days-ago", "an-hour-ago", "exactly-now"]
    );
    assert!(queue.iter().all(|c| c.next_review <= now));
    assert!(queue.windows(2).all(|w| w[0].next_review <= w[1].next_review));
}

#[test]
fn tag_filter_keeps_any_intersection() {
    let now = at(1_700_000_000_000);
    let cards = deck(now);

    let spanish = build_queue(&cards, &["spanish".to_string()], now);
    assert_eq!(fronts(&spanish), vec!["two-days-ago", "also-two-days-ago"]);

    let both = build_queue(&cards, &["french".to_string(), "german".to_string()], now);
    assert_eq!(fronts(&both), vec!["also-two-days-ago", "an-hour-ago"]);

    let none = build_queue(&cards, &["german".to_string()], now);
    assert!(none.is_empty());
}

#[test]
fn empty_session_is_idle_and_safe() {
    let now = at(1_700_000_000_000);
    let mut collection = CardCollection::from_cards(vec![card("later", now + Duration::days(3), &[])]);
    let before = collection.clone();
    let mut session = ReviewSession::start(collection.cards(), vec![], now);

    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(session.position(), None);
    session.flip();
    assert!(!session.is_flipped());
    session.advance(Direction::Next);
    session.advance(Direction::Previous);
    assert_eq!(session.cursor(), 0);
    assert!(session.record_outcome(&mut collection, true, now).is_none());
    assert_eq!(collection, before);
}

#[test]
fn flip_and_advance_drive_the_states() {
    let now = at(1_700_000_000_000);
    let collection = CardCollection::from_cards(deck(now));
    let mut session = ReviewSession::start(collection.cards(), vec![], now);

    assert_eq!(session.state(), SessionState::Presenting);
    session.flip();
    assert_eq!(session.state(), SessionState::Revealed);
    session.flip();
    assert_eq!(session.state(), SessionState::Presenting);

    session.flip();
    session.advance(Direction::Next);
    assert_eq!(session.cursor(), 1);
    assert_eq!(session.state(), SessionState::Presenting);
    assert_eq!(session.current(&collection).unwrap().front, "also-two-days-ago");
    assert_eq!(session.position(), Some((2, 4)));
}

#[test]
fn advance_saturates_at_both_ends() {
    let now = at(1_700_000_000_000);
    let collection = CardCollection::from_cards(deck(now));
    let mut session = ReviewSession::start(collection.cards(), vec![], now);

    session.advance(Direction::Previous);
    assert_eq!(session.cursor(), 0);

    for _ in 0..10 {
        session.advance(Direction::Next);
    }
    assert_eq!(session.cursor(), 3);
    assert!(session.is_at_end());
    session.flip();
    session.advance(Direction::Next);
    assert_eq!(session.cursor(), 3);
    assert!(!session.is_flipped());
}

#[test]
fn record_outcome_updates_one_card_and_keeps_queue() {
    let now = at(1_700_000_000_000);
    let mut collection = CardCollection::from_cards(deck(now));
    let mut session = ReviewSession::start(collection.cards(), vec![], now);
    let queue_before = session.queue().to_vec();
    let target = session.current_id().unwrap().to_string();
    let untouched: Vec<Card> = collection.cards().iter().filter(|c| c.id != target).cloned().collect();

    session.flip();
    let out = session.record_outcome(&mut collection, false, now).unwrap();

    assert_eq!(out.updated_card.id, target);
    assert!(!session.is_flipped());
    assert_eq!(session.cursor(), 0);
    assert_eq!(session.queue(), queue_before.as_slice());

    let updated = collection.get(&target).unwrap();
    assert_eq!(updated.difficulty, 2.0);
    assert_eq!(updated.last_reviewed, Some(now));
    assert_eq!(updated.next_review, now + Duration::days(3));
    assert_eq!(updated.review_count, 1);
    assert_eq!(updated.incorrect_count, 1);
    assert_eq!(updated.correct_count, 0);
    assert!(updated.counters_consistent());

    let others: Vec<Card> = collection.cards().iter().filter(|c| c.id != target).cloned().collect();
    assert_eq!(others, untouched);

    // The answered card is no longer due, but stays put until a rebuild.
    assert_eq!(session.current_id(), Some(target.as_str()));
    session.rebuild(collection.cards(), now);
    assert_eq!(session.len(), 3);
    assert!(!session.queue().contains(&target));
}

#[test]
fn record_outcome_on_deleted_card_is_a_noop() {
    let now = at(1_700_000_000_000);
    let mut collection = CardCollection::from_cards(deck(now));
    let mut session = ReviewSession::start(collection.cards(), vec![], now);
    let target = session.current_id().unwrap().to_string();
    collection.delete(&target).unwrap();

    assert!(session.current(&collection).is_none());
    assert!(session.record_outcome(&mut collection, true, now).is_none());
    assert_eq!(collection.len(), 4);
}

#[test]
fn toggling_tags_rebuilds_and_clamps_cursor() {
    let now = at(1_700_000_000_000);
    let collection = CardCollection::from_cards(deck(now));
    let mut session = ReviewSession::start(collection.cards(), vec![], now);
    session.advance(Direction::Next);
    session.advance(Direction::Next);
    session.advance(Direction::Next);
    assert_eq!(session.cursor(), 3);

    session.toggle_tag("spanish", collection.cards(), now);
    assert_eq!(session.selected_tags(), ["spanish".to_string()].as_slice());
    assert_eq!(session.len(), 2);
    assert_eq!(session.cursor(), 1);

    session.toggle_tag("spanish", collection.cards(), now);
    assert!(session.selected_tags().is_empty());
    assert_eq!(session.len(), 4);
}
