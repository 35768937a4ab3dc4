use std::io::{self, Read};
use std::path::PathBuf;

use clap::{Parser as ClapParser, Subcommand};
use search_syntax::cli::{
    self, CheckOptions, CheckResult, CliError, CompleteOptions, execute_check, execute_complete,
};
use search_syntax::output::{CompletionReport, ParseReport, to_json, to_json_pretty};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "searchq")]
#[command(about = "searchq - Parse, validate and autocomplete issue search queries")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the token tree of a query as JSON
    Parse {
        /// The query to parse (reads from stdin if not provided)
        query: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// Parser configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Field registry file
        #[arg(short, long)]
        registry: Option<PathBuf>,
    },

    /// Validate a query, exiting non-zero when a filter is invalid
    Check {
        /// The query to validate (reads from stdin if not provided)
        query: Option<String>,

        /// Parser configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Field registry file
        #[arg(short, long)]
        registry: Option<PathBuf>,
    },

    /// Print the suggestions for a caret position
    Complete {
        /// The query being edited
        query: String,

        /// Caret position in characters (defaults to the end)
        #[arg(long)]
        cursor: Option<usize>,

        /// JSON array of tags to suggest
        #[arg(short, long)]
        tags: Option<PathBuf>,

        /// Search bar options as JSON
        #[arg(long)]
        options: Option<String>,

        /// Parser configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Field registry file
        #[arg(short, long)]
        registry: Option<PathBuf>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// List documentation categories
    Docs,

    /// Show documentation for a specific category
    Doc {
        /// Category name (use 'searchq docs' to list categories)
        category: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Parse {
            query,
            pretty,
            config,
            registry,
        } => run_parse(query, pretty, config, registry),
        Commands::Check {
            query,
            config,
            registry,
        } => run_check(query, config, registry),
        Commands::Complete {
            query,
            cursor,
            tags,
            options,
            config,
            registry,
            pretty,
        } => {
            let options = CompleteOptions {
                query,
                cursor,
                config,
                registry,
                tags,
                options,
            };
            run_complete(options, pretty).await
        }
        Commands::Docs => {
            print!("{}", cli::get_docs_overview());
            Ok(true)
        }
        Commands::Doc { category } => cli::get_doc_category(&category).map(|content| {
            print!("{}", content);
            true
        }),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

fn read_query(query: Option<String>) -> Result<String, CliError> {
    match query {
        Some(query) => Ok(query),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer.trim_end_matches(['\n', '\r']).to_string())
        }
        None => Err(CliError::NoQuery),
    }
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<(), CliError> {
    let json = if pretty {
        to_json_pretty(value)
    } else {
        to_json(value)
    }?;
    println!("{}", json);
    Ok(())
}

fn run_parse(
    query: Option<String>,
    pretty: bool,
    config: Option<PathBuf>,
    registry: Option<PathBuf>,
) -> Result<bool, CliError> {
    let options = CheckOptions {
        query: read_query(query)?,
        config,
        registry,
    };
    let result = execute_check(&options)?.into_parse_result();
    print_json(&ParseReport::new(&options.query, &result), pretty)?;
    Ok(result.is_ok())
}

fn run_check(
    query: Option<String>,
    config: Option<PathBuf>,
    registry: Option<PathBuf>,
) -> Result<bool, CliError> {
    let options = CheckOptions {
        query: read_query(query)?,
        config,
        registry,
    };
    match execute_check(&options)? {
        CheckResult::Valid(_) => {
            println!("Query is valid");
            Ok(true)
        }
        CheckResult::Invalid {
            text,
            offset,
            reason,
            ..
        } => {
            println!("Invalid filter \"{}\" at offset {}: {}", text, offset, reason);
            Ok(false)
        }
        CheckResult::SyntaxError(err) => {
            println!("Syntax error: {}", err);
            Ok(false)
        }
    }
}

async fn run_complete(options: CompleteOptions, pretty: bool) -> Result<bool, CliError> {
    let suggestions = execute_complete(&options).await?;
    let cursor = options
        .cursor
        .unwrap_or_else(|| options.query.chars().count());
    let report = CompletionReport {
        query: &options.query,
        cursor,
        suggestions: Some(&suggestions),
    };
    print_json(&report, pretty)?;
    Ok(true)
}
