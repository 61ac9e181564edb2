//! CLI interface for reparse-tools

use clap::{Args, Parser, Subcommand};
use reparse::parsing::DEFAULT_MAX_DEPTH;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "reparse")]
#[command(about = "Compile PEG grammars and run incremental parses")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile a grammar and list its rules
    Check {
        /// Grammar file
        #[arg(short, long)]
        grammar: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: GrammarFormat,
    },

    /// Parse a subject, optionally applying edits and re-parsing after each
    Parse(ParseArgs),
}

#[derive(Args)]
pub struct ParseArgs {
    /// Grammar file
    #[arg(short, long)]
    pub grammar: PathBuf,

    /// File holding the subject
    #[arg(short, long, conflicts_with = "text", required_unless_present = "text")]
    pub input: Option<PathBuf>,

    /// Subject given inline
    #[arg(short, long)]
    pub text: Option<String>,

    /// Rule to parse with
    #[arg(short, long, default_value = "start")]
    pub rule: String,

    /// Replace positions LO..HI with TEXT, then parse again (repeatable)
    #[arg(short, long = "edit", value_name = "LO:HI:TEXT")]
    pub edits: Vec<Edit>,

    /// Output format
    #[arg(short, long, default_value = "ast")]
    pub format: OutputFormat,

    /// Print chart statistics and edit reports to stderr
    #[arg(long)]
    pub stats: bool,

    /// Evaluate every rule call from scratch
    #[arg(long)]
    pub no_memo: bool,

    /// Drop the whole chart on every edit
    #[arg(long)]
    pub rebuild: bool,

    /// Maximum number of nested rule evaluations
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,
}

/// A `LO:HI:TEXT` edit; `TEXT` may itself contain colons and may be empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edit {
    pub lo: usize,
    pub hi: usize,
    pub text: String,
}

impl std::str::FromStr for Edit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        let (Some(lo), Some(hi)) = (parts.next(), parts.next()) else {
            return Err(format!("Invalid edit: {s}. Expected LO:HI:TEXT"));
        };
        let position = |field: &str| {
            field
                .trim()
                .parse::<usize>()
                .map_err(|_| format!("Invalid edit position `{field}` in {s}"))
        };
        Ok(Self {
            lo: position(lo)?,
            hi: position(hi)?,
            text: parts.next().unwrap_or_default().to_owned(),
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GrammarFormat {
    Text,
    Dot,
}

impl std::str::FromStr for GrammarFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "dot" | "graphviz" => Ok(Self::Dot),
            _ => Err(format!("Unknown format: {s}. Supported: text, dot")),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Tuple tree, one node per action
    Ast,
    /// Values from the built-in arithmetic and conversion actions
    Value,
    /// The raw op stream
    Ops,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ast" => Ok(Self::Ast),
            "value" | "eval" => Ok(Self::Value),
            "ops" => Ok(Self::Ops),
            "json" => Ok(Self::Json),
            _ => Err(format!(
                "Unknown format: {s}. Supported: ast, value, ops, json"
            )),
        }
    }
}
