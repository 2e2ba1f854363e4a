//! Tripod CLI.
//!
//! A thin front end over the disk engine: import N-Triples-like files,
//! mutate the store, and run `select`/`where` queries from the shell.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tripod_store::{DiskConfig, DiskGraph, Graph, Variable};

#[derive(Parser)]
#[command(name = "tripod")]
#[command(author, version, about = "Embedded RDF triple store")]
struct Cli {
    /// Store file (created on first use).
    #[arg(short, long, default_value = "tripod.redb", global = true)]
    store: PathBuf,

    /// Base IRI; named nodes under it are stored relative.
    #[arg(long, default_value = "", global = true)]
    base: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load triples from an N-Triples-like file.
    Import {
        /// Input file, one triple per line.
        file: PathBuf,
    },

    /// Insert triples given as N-Triples-like statements.
    Insert {
        /// Statements, e.g. '<http://a> <http://p> "x" .'
        statements: Vec<String>,
    },

    /// Delete triples given as N-Triples-like statements.
    Delete {
        statements: Vec<String>,
    },

    /// Match triple patterns and print the constructed result graph.
    Where {
        /// Patterns, e.g. '?s <http://p> ?o'
        patterns: Vec<String>,
    },

    /// Match triple patterns and print projected rows as JSON.
    Select {
        /// Variables to project, without the leading '?'.
        #[arg(short, long = "var", required = true)]
        vars: Vec<String>,
        patterns: Vec<String>,
    },

    /// Print node/triple/predicate counts.
    Stats,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = DiskConfig::new(&cli.store).with_base(cli.base.clone());
    let mut graph = DiskGraph::open_with(config)
        .with_context(|| format!("opening store {}", cli.store.display()))?;

    match cli.command {
        Commands::Import { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let triples = tripod_nt::parse_triples(&text)?;
            let added = graph.insert(&triples)?;
            println!(
                "{} {} of {} triples from {}",
                "imported".green().bold(),
                added,
                triples.len(),
                file.display()
            );
        }

        Commands::Insert { statements } => {
            let triples = tripod_nt::parse_triples(&statements.join("\n"))?;
            let added = graph.insert(&triples)?;
            println!("{} {} triples", "inserted".green().bold(), added);
        }

        Commands::Delete { statements } => {
            let triples = tripod_nt::parse_triples(&statements.join("\n"))?;
            let removed = graph.delete(&triples)?;
            println!("{} {} triples", "deleted".red().bold(), removed);
        }

        Commands::Where { patterns } => {
            let patterns = tripod_nt::parse_patterns(&patterns.join("\n"))?;
            let result = graph.where_(&patterns)?;
            for triple in result.triples()? {
                println!("{triple} .");
            }
        }

        Commands::Select { vars, patterns } => {
            let patterns = tripod_nt::parse_patterns(&patterns.join("\n"))?;
            let vars = vars
                .iter()
                .map(|name| Variable::new(name.clone()))
                .collect::<Result<Vec<_>, _>>()
                .context("invalid variable name")?;
            let rows = graph.select(&vars, &patterns)?;
            for row in rows {
                let cells: Vec<String> = row.iter().map(|term| term.to_string()).collect();
                println!("{}", serde_json::to_string(&cells)?);
            }
        }

        Commands::Stats => {
            let stats = graph.stats()?;
            println!("{}", "store statistics".bold());
            println!("  nodes:      {}", stats.nodes);
            println!("  triples:    {}", stats.triples);
            println!("  predicates: {}", stats.predicates);
        }
    }

    Ok(())
}
