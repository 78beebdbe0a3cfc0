use crate::cli::opts::*;
use crate::cli::review::run_review;
use crate::generate::{Generator, GeneratorConfig};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use flashlearn_core::{
    export_cards, filter_by_tags, filter_by_text, import_cards, load_collection, save_collection, summarize,
    CardCollection, CardStore, CoreError,
};
use flashlearn_json::paths::data_root;
use flashlearn_json::JsonStore;
use flashlearn_sqlite::SqliteStore;
use std::sync::Arc;

pub async fn run_cli(args: Cli) -> Result<()> {
    let store = open_store(&args).await?;
    let mut coll = load_collection(&*store).await?;
    match args.cmd {
        Command::Card(cmd) => card_cmd(&*store, &mut coll, cmd).await,
        Command::Review(cmd) => {
            let stdin = std::io::stdin();
            let mut input = stdin.lock();
            let mut out = std::io::stdout();
            run_review(&*store, &mut coll, cmd.tags, &mut input, &mut out).await?;
            Ok(())
        }
        Command::Stats => {
            let s = summarize(coll.cards(), Utc::now());
            println!("total cards\t{}", s.total_cards);
            println!("mastered\t{}", s.mastered_cards);
            println!("due for review\t{}", s.reviews_due);
            println!("reviews\t{}", s.total_reviews);
            println!("accuracy\t{}%", s.accuracy);
            Ok(())
        }
        Command::Tags => {
            for t in coll.all_tags() {
                println!("{t}");
            }
            Ok(())
        }
        Command::Export { path } => {
            let s = export_cards(coll.cards())?;
            std::fs::write(&path, s).with_context(|| format!("writing {}", path.display()))?;
            println!("wrote {} cards to {}", coll.len(), path.display());
            Ok(())
        }
        Command::Import { path } => {
            let data = std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
            match import_cards(&data, Utc::now()) {
                Ok(cards) => {
                    let n = coll.merge(cards);
                    save_collection(&*store, &coll).await?;
                    println!("imported {n} cards");
                }
                Err(e) => {
                    log::warn!("import of {} rejected: {e}", path.display());
                    println!("invalid JSON: expected an array of flashcards ({e}); nothing imported");
                }
            }
            Ok(())
        }
        Command::Generate(cmd) => generate_cmd(&*store, &mut coll, cmd).await,
    }
}

pub async fn open_store(args: &Cli) -> Result<Arc<dyn CardStore>> {
    let root = args.data_dir.clone().unwrap_or_else(data_root);
    match args.store {
        StoreKind::Json => {
            let s = JsonStore::open_in(&root)?;
            log::debug!("using json store at {}", s.path().display());
            Ok(Arc::new(s))
        }
        StoreKind::Sqlite => {
            let p = args.db_path.clone().unwrap_or_else(|| root.join("flashlearn.sqlite3"));
            if let Some(parent) = p.parent() {
                std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
            }
            log::debug!("using sqlite store at {}", p.display());
            let s = SqliteStore::open_file(&p).await?;
            Ok(Arc::new(s))
        }
    }
}

async fn card_cmd(store: &dyn CardStore, coll: &mut CardCollection, cmd: CardCmd) -> Result<()> {
    match cmd {
        CardCmd::Add(a) => {
            let id = coll.create(&a.front, &a.back, &a.tags, Utc::now())?.id.clone();
            save_collection(store, coll).await?;
            println!("{id}");
        }
        CardCmd::List(l) => {
            let now = Utc::now();
            let mut cards = filter_by_tags(coll.cards(), &l.tags);
            if let Some(q) = &l.search {
                let hits: Vec<&str> = filter_by_text(coll.cards(), q).into_iter().map(|c| c.id.as_str()).collect();
                cards.retain(|c| hits.contains(&c.id.as_str()));
            }
            if l.due {
                cards.retain(|c| c.is_due(now));
            }
            for c in cards {
                let tags = if c.tags.is_empty() { "-".to_string() } else { c.tags.join(";") };
                println!(
                    "{}\t{}\t{}\ttags={}\tdifficulty={:.1}\treviews={}\tdue={}",
                    c.id,
                    c.front,
                    c.back,
                    tags,
                    c.difficulty,
                    c.review_count,
                    c.next_review.format("%Y-%m-%d %H:%M")
                );
            }
        }
        CardCmd::Rm { card_id } => {
            coll.delete(&card_id).map_err(|e| not_found(e, &card_id))?;
            save_collection(store, coll).await?;
            println!("ok");
        }
        CardCmd::Edit(e) => {
            if e.front.is_none() && e.back.is_none() && e.add_tags.is_empty() && e.rm_tags.is_empty() {
                bail!("nothing to change; pass --front, --back, --add-tag or --rm-tag");
            }
            coll.edit(&e.card_id, e.front.as_deref(), e.back.as_deref())
                .map_err(|err| not_found(err, &e.card_id))?;
            for t in &e.add_tags {
                coll.add_tag(&e.card_id, t)?;
            }
            for t in &e.rm_tags {
                coll.remove_tag(&e.card_id, t)?;
            }
            save_collection(store, coll).await?;
            println!("ok");
        }
    }
    Ok(())
}

async fn generate_cmd(store: &dyn CardStore, coll: &mut CardCollection, cmd: GenerateCmd) -> Result<()> {
    let text = match (&cmd.text, &cmd.file) {
        (Some(t), _) => t.clone(),
        (None, Some(p)) => std::fs::read_to_string(p).with_context(|| format!("reading {}", p.display()))?,
        (None, None) => bail!("pass --text or --file"),
    };
    let generator = Generator::new(GeneratorConfig {
        api_key: cmd.api_key.clone(),
        api_url: cmd.api_url.clone(),
        model: cmd.model.clone(),
    });
    let generated = generator.generate_or_empty(&text).await?;
    if generated.is_empty() {
        println!("no cards generated");
        return Ok(());
    }

    let now = Utc::now();
    let mut cards: Vec<_> = generated.into_iter().map(|g| g.into_card(now)).collect();
    if let Some(tag) = cmd.tag.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        for c in &mut cards {
            if !c.has_tag(tag) {
                c.tags.push(tag.to_string());
            }
        }
    }

    if cmd.dry_run {
        for c in &cards {
            println!("{}\t{}", c.front, c.back);
        }
        return Ok(());
    }
    let n = coll.merge(cards);
    save_collection(store, coll).await?;
    println!("added {n} generated cards");
    Ok(())
}

fn not_found(e: CoreError, id: &str) -> anyhow::Error {
    match e {
        CoreError::NotFound(_) => anyhow::anyhow!("card not found: {id}"),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sqlite_dir_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a dir").unwrap();

        let args = Cli {
            store: StoreKind::Sqlite,
            data_dir: Some(dir.path().to_path_buf()),
            db_path: Some(blocker.join("nested").join("flashlearn.sqlite3")),
            cmd: Command::Tags,
        };
        let err = open_store(&args).await.err().unwrap();
        assert!(err.to_string().starts_with("creating "), "{err:#}");
    }
}
