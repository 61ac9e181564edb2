//! reparse CLI
//!
//! Command-line driver for compiling grammars and parsing subjects.

use clap::Parser;
use miette::{IntoDiagnostic, WrapErr};
use reparse::error::diagnostics::format_error;
use reparse::semantics::{base_semantics, operator_semantics};
use reparse::{
    AstSemantics, ComboSemantics, Grammar, InvalidationStrategy, ParseError, ParsingConfig,
};
use reparse_tools::cli::{Cli, Commands, GrammarFormat, OutputFormat, ParseArgs};
use reparse_tools::report::{format_invalidation, format_stats, outcome_json};
use reparse_tools::visualize::generate_dot;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check { grammar, format } => check(&grammar, format),
        Commands::Parse(args) => parse(&args),
    }
}

fn load_grammar(path: &Path) -> miette::Result<Arc<Grammar>> {
    let text = fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read grammar {}", path.display()))?;
    let grammar = Grammar::compile(&text)
        .wrap_err_with(|| format!("Invalid grammar {}", path.display()))?;
    info!(path = %path.display(), rules = grammar.len(), "compiled grammar");
    Ok(grammar)
}

fn check(path: &Path, format: GrammarFormat) -> miette::Result<()> {
    let grammar = load_grammar(path)?;

    match format {
        GrammarFormat::Text => {
            print!("{grammar}");
            eprintln!("{} rules", grammar.len());
        }
        GrammarFormat::Dot => print!("{}", generate_dot(&grammar)),
    }
    Ok(())
}

/// Attach the location and an excerpt of the subject to a parse error.
fn located(err: ParseError, filename: Option<&str>) -> miette::Report {
    let context = format_error(&err, None, filename);
    miette::Report::new(err).wrap_err(context)
}

fn parse(args: &ParseArgs) -> miette::Result<()> {
    let grammar = load_grammar(&args.grammar)?;

    let (subject, filename) = match (&args.input, &args.text) {
        (Some(path), _) => {
            let subject = fs::read_to_string(path)
                .into_diagnostic()
                .wrap_err_with(|| format!("Failed to read input {}", path.display()))?;
            (subject, Some(path.display().to_string()))
        }
        (None, Some(text)) => (text.clone(), None),
        (None, None) => miette::bail!("Either --input or --text is required"),
    };
    let filename = filename.as_deref();

    let invalidation = if args.rebuild {
        InvalidationStrategy::Rebuild
    } else {
        InvalidationStrategy::Incremental
    };
    let config = ParsingConfig::default()
        .with_memoize(!args.no_memo)
        .with_invalidation(invalidation)
        .with_max_depth(args.max_depth)
        .with_entry_rule(args.rule.as_str());
    let mut parsing = grammar.parsing_with_config(&subject, config);

    let mut edits = Vec::with_capacity(args.edits.len());
    for edit in &args.edits {
        // Parse before each edit so the edit lands on a warm chart.
        parsing
            .parse_start()
            .map_err(|err| located(err, filename))?;
        let report = parsing.replace(edit.lo, edit.hi, &edit.text)?;
        if args.stats {
            eprintln!("{}", format_invalidation(&report));
        }
        edits.push(report);
    }

    let outcome = parsing
        .parse_start()
        .map_err(|err| located(err, filename))?;
    let stats = outcome.parsing().stats();

    match args.format {
        OutputFormat::Ops => println!("{outcome}"),
        OutputFormat::Ast => {
            let values = outcome
                .interpret(&AstSemantics)
                .map_err(|err| located(err, filename))?;
            for value in values {
                println!("{value}");
            }
        }
        OutputFormat::Value => {
            let semantics = ComboSemantics::new()
                .with(operator_semantics())
                .with(base_semantics());
            let values = outcome
                .interpret(&semantics)
                .map_err(|err| located(err, filename))?;
            for value in values {
                println!("{value}");
            }
        }
        OutputFormat::Json => {
            let values = if outcome.is_full() {
                Some(
                    outcome
                        .interpret(&AstSemantics)
                        .map_err(|err| located(err, filename))?,
                )
            } else {
                None
            };
            let report = outcome_json(
                &outcome,
                values.as_deref(),
                &edits,
                args.stats.then_some(&stats),
            );
            let json = serde_json::to_string_pretty(&report).into_diagnostic()?;
            println!("{json}");
        }
    }

    if args.stats {
        eprintln!("{}", format_stats(&stats));
    }
    Ok(())
}
