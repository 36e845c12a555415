use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "askdb",
    version,
    about = "Ask questions of SQLite databases in plain language"
)]
pub struct Cli {
    /// YAML configuration file (missing file means defaults)
    #[arg(long, global = true, default_value = "askdb.yaml", env = "ASKDB_CONFIG")]
    pub config: PathBuf,

    /// reject unknown keys in the configuration file
    #[arg(long, global = true)]
    pub strict_config: bool,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write a sample askdb.yaml
    Init,
    /// List the selectable models
    Models,
    /// Manage the database directory
    Db(DbArgs),
    /// Plain-language explanation of a database's schema
    Explain(AnalyzeArgs),
    /// Five example questions for a database
    Suggest(AnalyzeArgs),
    /// Mermaid ER diagram of a database
    Diagram(DiagramArgs),
    /// Translate a question into SQL, optionally running it
    Ask(AskArgs),
    /// Run SQL directly against a database
    Exec(ExecArgs),
    /// Show or bookmark previously executed questions
    History(HistoryArgs),
    /// Manage the analysis cache
    Cache(CacheArgs),
}

#[derive(clap::Args, Clone)]
pub struct DbArgs {
    #[command(subcommand)]
    pub cmd: DbSub,
}

#[derive(Subcommand, Clone)]
pub enum DbSub {
    List,
    /// Create an empty database and register its metadata
    Add {
        key: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        icon: String,
    },
    /// Delete the database file, its metadata and its cached analyses
    Delete { key: String },
}

#[derive(clap::Args, Clone)]
pub struct AnalyzeArgs {
    /// database key (see `askdb db list`)
    pub db: String,

    /// model identifier (defaults to the configured model)
    #[arg(long)]
    pub model: Option<String>,
}

#[derive(clap::Args, Clone)]
pub struct DiagramArgs {
    pub db: String,
}

#[derive(clap::Args, Clone)]
pub struct AskArgs {
    pub db: String,
    pub question: String,

    #[arg(long)]
    pub model: Option<String>,

    /// run the generated SQL and print its result
    #[arg(long)]
    pub execute: bool,

    /// export the result; `.csv` writes CSV, anything else JSON (requires --execute)
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(clap::Args, Clone)]
pub struct ExecArgs {
    pub db: String,
    pub sql: String,

    /// export the result; `.csv` writes CSV, anything else JSON
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// print the full result as JSON instead of a table
    #[arg(long)]
    pub json: bool,

    #[arg(long, default_value_t = 100)]
    pub max_rows: usize,
}

#[derive(clap::Args, Clone)]
#[command(args_conflicts_with_subcommands = true)]
pub struct HistoryArgs {
    #[command(subcommand)]
    pub cmd: Option<HistorySub>,

    /// only entries for this database
    #[arg(long)]
    pub db: Option<String>,

    #[arg(long, default_value_t = askdb_core::storage::history::DEFAULT_LIST_LIMIT)]
    pub limit: u32,
}

#[derive(Subcommand, Clone)]
pub enum HistorySub {
    /// Toggle the bookmark flag of an entry
    Bookmark { id: i64 },
}

#[derive(clap::Args, Clone)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub cmd: CacheSub,
}

#[derive(Subcommand, Clone)]
pub enum CacheSub {
    /// Drop cached analyses for one database, or all of them
    Clear { db: Option<String> },
}
