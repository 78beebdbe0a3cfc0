use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StoreKind {
    Json,
    Sqlite,
}

#[derive(Debug, Parser, Clone)]
#[command(name = "flashlearn", version, about = "FlashLearn spaced-repetition flashcards")]
pub struct Cli {
    /// Storage backend
    #[arg(long, value_enum, env = "FLASHLEARN_STORE", default_value_t = StoreKind::Json)]
    pub store: StoreKind,

    /// Directory holding the card store (defaults to the app data dir)
    #[arg(long, env = "FLASHLEARN_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// SQLite DB path when --store sqlite (defaults to <data-dir>/flashlearn.sqlite3)
    #[arg(long, env = "FLASHLEARN_DB_PATH")]
    pub db_path: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Card operations
    #[command(subcommand)]
    Card(CardCmd),
    /// Interactive review of due cards
    Review(ReviewCmd),
    /// Collection totals, mastery and accuracy
    Stats,
    /// List every tag in use
    Tags,
    /// Write the whole collection as JSON
    Export { path: PathBuf },
    /// Add cards from a JSON array
    Import { path: PathBuf },
    /// Generate cards from free text with OpenAI
    Generate(GenerateCmd),
}

#[derive(Debug, Subcommand, Clone)]
pub enum CardCmd {
    Add(CardAdd),
    List(CardList),
    Rm { card_id: String },
    Edit(CardEdit),
}

#[derive(Debug, Args, Clone)]
pub struct CardAdd {
    #[arg(long)]
    pub front: String,
    #[arg(long)]
    pub back: String,
    #[arg(long = "tag")]
    pub tags: Vec<String>,
}

#[derive(Debug, Args, Clone)]
pub struct CardList {
    /// Only cards carrying one of these tags
    #[arg(long = "tag")]
    pub tags: Vec<String>,
    /// Case-insensitive match on front, back or tags
    #[arg(long)]
    pub search: Option<String>,
    /// Only cards due now
    #[arg(long)]
    pub due: bool,
}

#[derive(Debug, Args, Clone)]
pub struct CardEdit {
    pub card_id: String,
    #[arg(long)]
    pub front: Option<String>,
    #[arg(long)]
    pub back: Option<String>,
    #[arg(long = "add-tag")]
    pub add_tags: Vec<String>,
    #[arg(long = "rm-tag")]
    pub rm_tags: Vec<String>,
}

#[derive(Debug, Args, Clone)]
pub struct ReviewCmd {
    /// Only review cards carrying one of these tags
    #[arg(long = "tag")]
    pub tags: Vec<String>,
}

#[derive(Debug, Args, Clone)]
pub struct GenerateCmd {
    /// Source text
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    pub text: Option<String>,
    /// Read source text from a file
    #[arg(long)]
    pub file: Option<PathBuf>,
    /// Extra tag applied to every generated card
    #[arg(long)]
    pub tag: Option<String>,
    /// Print the generated cards without adding them
    #[arg(long)]
    pub dry_run: bool,
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
    #[arg(long, env = "FLASHLEARN_OPENAI_URL", default_value = crate::generate::OPENAI_URL)]
    pub api_url: String,
    #[arg(long, env = "FLASHLEARN_OPENAI_MODEL", default_value = crate::generate::DEFAULT_MODEL)]
    pub model: String,
}
