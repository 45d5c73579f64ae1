//! imcite command line: search providers, keep a local paper library, and
//! print citation-graph snapshots as they are built.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use imcite_core::{
    default_extractor, CrossrefClient, GraphBuilder, GraphConfig, LibraryStore, OpenAlexClient,
    Paper, ProviderClient, SearchEngine, SearchFields, SemanticScholarClient, DEFAULT_LIMIT,
};

#[derive(Parser)]
#[command(name = "imcite", about = "Search bibliographic APIs and build citation graphs")]
struct Cli {
    /// Library file (defaults to the platform data directory)
    #[arg(long, env = "IMCITE_LIBRARY")]
    library: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Free-text search across all providers
    Search {
        query: String,
        /// Results per provider
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,
        /// Print full JSON records
        #[arg(long)]
        json: bool,
    },
    /// Structured search (any combination of fields; a DOI short-circuits)
    SearchAdvanced {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        venue: Option<String>,
        #[arg(long)]
        year_from: Option<i32>,
        #[arg(long)]
        year_to: Option<i32>,
        #[arg(long)]
        doi: Option<String>,
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,
        #[arg(long)]
        json: bool,
    },
    /// Look a paper up by DOI, enrich it, and save it to the library
    Add { doi: String },
    /// List the configured metadata providers
    Sources,
    /// List saved papers
    List {
        #[arg(long)]
        json: bool,
    },
    /// Remove a paper by id
    Remove { id: String },
    /// Build the citation graph and print each snapshot as it arrives
    Graph {
        /// Max intermediates to expand in the second-degree pass
        #[arg(long, default_value_t = 20)]
        intermediates: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let library_path = match cli.library {
        Some(path) => path,
        None => default_library_path()?,
    };

    match cli.command {
        Command::Search { query, limit, json } => {
            let engine = SearchEngine::with_default_providers();
            let papers = engine.search(&query, limit).await;
            print_papers(&papers, json)?;
        }
        Command::SearchAdvanced {
            title,
            author,
            venue,
            year_from,
            year_to,
            doi,
            limit,
            json,
        } => {
            let fields = SearchFields {
                title,
                author,
                venue,
                year_from,
                year_to,
                doi,
            };
            let engine = SearchEngine::with_default_providers();
            let papers = engine.search_advanced(&fields, limit).await;
            print_papers(&papers, json)?;
        }
        Command::Add { doi } => {
            let client = SemanticScholarClient::new();
            let paper = client
                .lookup_by_doi(&doi)
                .await
                .with_context(|| format!("no paper found for DOI {doi}"))?;
            let enriched = default_extractor().enrich(paper);

            let mut store = LibraryStore::open(&library_path)?;
            let (title, id) = (enriched.title.clone(), enriched.id.clone());
            store.add_paper(enriched)?;
            println!("Saved: {title} ({id})");
        }
        Command::Sources => {
            for meta in [
                SemanticScholarClient::metadata(),
                CrossrefClient::metadata(),
                OpenAlexClient::metadata(),
            ] {
                let refs = if meta.supports_references {
                    "  [references]"
                } else {
                    ""
                };
                println!("{:<16} {}  {}{}", meta.id, meta.name, meta.base_url, refs);
            }
        }
        Command::List { json } => {
            let store = LibraryStore::open(&library_path)?;
            let mut papers = store.all_papers();
            papers.sort_by(|a, b| a.title.cmp(&b.title));
            print_papers(&papers, json)?;
        }
        Command::Remove { id } => {
            let mut store = LibraryStore::open(&library_path)?;
            if store.remove_paper(&id)? {
                println!("Removed {id}");
            } else {
                println!("No paper with id {id}");
            }
        }
        Command::Graph { intermediates } => {
            let store = LibraryStore::open(&library_path)?;
            let papers = store.all_papers();
            if papers.is_empty() {
                println!("Library is empty; nothing to graph.");
                return Ok(());
            }

            let provider = SemanticScholarClient::new();
            let config = GraphConfig {
                intermediate_cap: intermediates,
            };
            let builder = GraphBuilder::with_config(&provider, config);

            let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
            // Dropping tx when the build ends closes the channel and lets
            // the printer finish.
            let build = async {
                builder.build(papers, &tx).await;
                drop(tx);
            };
            let print = async {
                let mut wave = 0;
                while let Some(snapshot) = rx.recv().await {
                    wave += 1;
                    println!(
                        "wave {wave}: {} papers, {} edges",
                        snapshot.papers.len(),
                        snapshot.edges.len()
                    );
                    for edge in &snapshot.edges {
                        println!("  {} -- {} (degree {})", edge.source, edge.target, edge.degree);
                    }
                }
            };
            tokio::join!(build, print);
        }
    }

    Ok(())
}

fn default_library_path() -> Result<PathBuf> {
    let base = dirs::data_dir().context("could not determine a data directory")?;
    Ok(base.join("imcite").join("library.json"))
}

fn print_papers(papers: &[Paper], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(papers)?);
        return Ok(());
    }
    if papers.is_empty() {
        println!("No results.");
        return Ok(());
    }
    for paper in papers {
        let year = paper
            .year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "----".to_string());
        let venue = paper.venue.as_deref().unwrap_or("");
        println!("[{year}] {} by {}", paper.title, paper.authors.join(", "));
        if !venue.is_empty() || paper.doi.is_some() {
            println!(
                "       {}{}{}",
                venue,
                if venue.is_empty() { "" } else { "  " },
                paper.doi.as_deref().unwrap_or("")
            );
        }
        println!("       id: {}", paper.id);
    }
    Ok(())
}
