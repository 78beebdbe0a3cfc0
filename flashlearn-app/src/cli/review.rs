use anyhow::Result;
use chrono::Utc;
use flashlearn_core::{save_collection, CardCollection, CardStore, Direction, ReviewSession, SessionState};
use std::collections::HashSet;
use std::io::{BufRead, Write};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReviewSummary {
    pub reviewed: u32,
    pub correct: u32,
}

enum Input {
    Flip,
    Answer(bool),
    Move(Direction),
    ToggleTag(String),
    Quit,
    Unknown,
}

fn parse_input(line: &str) -> Input {
    let line = line.trim();
    if let Some(tag) = line.strip_prefix("t ") {
        return Input::ToggleTag(tag.trim().to_string());
    }
    match line.to_lowercase().as_str() {
        "" | "f" | "flip" => Input::Flip,
        "y" | "yes" | "knew" => Input::Answer(true),
        "n" | "no" => Input::Answer(false),
        ">" | "next" => Input::Move(Direction::Next),
        "<" | "prev" | "previous" => Input::Move(Direction::Previous),
        "q" | "quit" => Input::Quit,
        _ => Input::Unknown,
    }
}

/// Steps through due cards until every queued card is answered, the user
/// quits, or input runs out. The collection is saved after each answer.
pub async fn run_review<S, R, W>(
    store: &S,
    collection: &mut CardCollection,
    tags: Vec<String>,
    input: &mut R,
    out: &mut W,
) -> Result<ReviewSummary>
where
    S: CardStore + ?Sized,
    R: BufRead,
    W: Write,
{
    let mut session = ReviewSession::start(collection.cards(), tags, Utc::now());
    let mut summary = ReviewSummary::default();
    let mut answered: HashSet<String> = HashSet::new();

    if session.state() == SessionState::Idle {
        writeln!(out, "no cards due")?;
        return Ok(summary);
    }
    writeln!(out, "{} card(s) due", session.len())?;

    loop {
        let state = session.state();
        if state == SessionState::Idle {
            writeln!(out, "no cards due under the current filter")?;
            break;
        }
        let Some(card) = session.current(collection) else {
            break;
        };
        let (pos, len) = session.position().unwrap_or((0, 0));
        if state == SessionState::Presenting {
            writeln!(out, "\n[{pos}/{len}] Q: {}", card.front)?;
            write!(out, "[enter=flip, >/< move, t TAG filter, q quit] ")?;
        } else {
            writeln!(out, "A: {}", card.back)?;
            write!(out, "[y=knew it, n=didn't know, enter=flip back, q quit] ")?;
        }
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }

        match parse_input(&line) {
            Input::Flip => session.flip(),
            Input::Answer(_) if state != SessionState::Revealed => {
                writeln!(out, "flip the card first")?;
            }
            Input::Answer(correct) => {
                let Some(outcome) = session.record_outcome(collection, correct, Utc::now()) else {
                    break;
                };
                save_collection(store, collection).await?;
                summary.reviewed += 1;
                if correct {
                    summary.correct += 1;
                }
                answered.insert(outcome.updated_card.id.clone());
                writeln!(out, "→ next due in {} day(s)", outcome.next.wait_days)?;

                if session.queue().iter().all(|id| answered.contains(id)) {
                    break;
                }
                session.advance(Direction::Next);
            }
            Input::Move(dir) => session.advance(dir),
            Input::ToggleTag(tag) => {
                session.toggle_tag(&tag, collection.cards(), Utc::now());
                writeln!(out, "filter: [{}], {} due", session.selected_tags().join(", "), session.len())?;
            }
            Input::Quit => break,
            Input::Unknown => writeln!(out, "unknown input")?,
        }
    }

    writeln!(out, "\nreviewed {} ({} correct)", summary.reviewed, summary.correct)?;
    Ok(summary)
}
