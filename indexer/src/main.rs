use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use engine::config::DEFAULT_K;
use engine::{DocumentId, IndexStore, TermCount};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::fmt::Write as _;
use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Index text documents in memory and query them by tf-idf", long_about = None)]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List documents containing a term
    Lookup {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
        #[arg(long)]
        term: String,
    },
    /// Rank documents containing a term by tf-idf
    Rank {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
        #[arg(long)]
        term: String,
        /// Maximum number of documents to print
        #[arg(long, default_value_t = DEFAULT_K)]
        limit: usize,
    },
    /// Show tf, idf and tf-idf of a term in one document
    Score {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
        /// Document id (path relative to the input root)
        #[arg(long)]
        doc: String,
        #[arg(long)]
        term: String,
    },
    /// Show document and term counts
    Stats {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
    },
}

#[derive(Debug, Serialize)]
struct ScoreReport {
    id: DocumentId,
    term: String,
    tf: TermCount,
    idf: f64,
    tf_idf: f64,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();
    let out = run(&cli)?;
    print!("{out}");
    Ok(())
}

fn run(cli: &Cli) -> Result<String> {
    let mut out = String::new();
    match &cli.command {
        Commands::Lookup { input, term } => {
            let store = build_store(Path::new(input))?;
            let mut ids: Vec<DocumentId> = store.index_lookup(term).into_iter().collect();
            ids.sort();
            if cli.json {
                let body = serde_json::json!({ "term": term, "documents": ids });
                out = serde_json::to_string_pretty(&body)?;
                out.push('\n');
            } else {
                for id in ids {
                    writeln!(out, "{id}")?;
                }
            }
        }
        Commands::Rank { input, term, limit } => {
            let store = build_store(Path::new(input))?;
            let ranked: Vec<_> =
                engine::relevance_scores(&store, term).into_iter().take(*limit).collect();
            if cli.json {
                let body = serde_json::json!({ "term": term, "results": ranked });
                out = serde_json::to_string_pretty(&body)?;
                out.push('\n');
            } else {
                for hit in ranked {
                    writeln!(out, "{:.6}\t{}", hit.score, hit.id)?;
                }
            }
        }
        Commands::Score { input, doc, term } => {
            let store = build_store(Path::new(input))?;
            let id = DocumentId::from(doc.as_str());
            let report = ScoreReport {
                tf: store.term_frequency(&id, term)?,
                idf: store.inverse_document_frequency(term),
                tf_idf: store.tf_idf(&id, term)?,
                term: term.clone(),
                id,
            };
            if cli.json {
                out = serde_json::to_string_pretty(&report)?;
                out.push('\n');
            } else {
                writeln!(
                    out,
                    "tf={}\tidf={:.6}\ttf_idf={:.6}",
                    report.tf, report.idf, report.tf_idf
                )?;
            }
        }
        Commands::Stats { input } => {
            let stats = build_store(Path::new(input))?.stats();
            if cli.json {
                out = serde_json::to_string_pretty(&stats)?;
                out.push('\n');
            } else {
                writeln!(
                    out,
                    "documents={}\tdistinct_terms={}\ttotal_terms={}",
                    stats.documents, stats.distinct_terms, stats.total_terms
                )?;
            }
        }
    }
    Ok(out)
}

/// Every regular file under `input` paired with its id: the path relative to
/// `input` with `/` separators, or the bare file name when `input` is a file.
fn collect_documents(input: &Path) -> Result<Vec<(DocumentId, PathBuf)>> {
    let mut files: Vec<(DocumentId, PathBuf)> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() {
                let rel = p.strip_prefix(input).unwrap_or(p);
                let id = rel
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                files.push((DocumentId::from(id), p.to_path_buf()));
            }
        }
    } else if input.is_file() {
        let name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| input.to_string_lossy().into_owned());
        files.push((DocumentId::from(name), input.to_path_buf()));
    } else {
        bail!("input path {} does not exist", input.display());
    }
    files.sort();
    Ok(files)
}

fn build_store(input: &Path) -> Result<IndexStore> {
    let mut store = IndexStore::new();
    for (id, path) in collect_documents(input)? {
        let f = File::open(&path).with_context(|| format!("opening {}", path.display()))?;
        store
            .add_document(id, f)
            .with_context(|| format!("reading {}", path.display()))?;
    }
    let stats = store.stats();
    tracing::info!(
        num_docs = stats.documents,
        num_terms = stats.distinct_terms,
        "ingested documents"
    );
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn corpus() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("a.txt"), "Rust is great.\nrust systems programming.").unwrap();
        fs::write(dir.path().join("b.txt"), "Learning rust.").unwrap();
        fs::write(dir.path().join("nested/c.txt"), "Go and Python.").unwrap();
        dir
    }

    fn cli(json: bool, command: Commands) -> Cli {
        Cli { json, command }
    }

    #[test]
    fn ids_are_relative_paths() {
        let dir = corpus();
        let ids: Vec<String> = collect_documents(dir.path())
            .unwrap()
            .into_iter()
            .map(|(id, _)| id.to_string())
            .collect();
        assert_eq!(ids, vec!["a.txt", "b.txt", "nested/c.txt"]);
    }

    #[test]
    fn single_file_uses_file_name() {
        let dir = corpus();
        let docs = collect_documents(&dir.path().join("b.txt")).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].0.as_str(), "b.txt");
    }

    #[test]
    fn missing_input_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(build_store(&dir.path().join("nope")).is_err());
    }

    #[test]
    fn lookup_lists_sorted_ids() {
        let dir = corpus();
        let input = dir.path().to_string_lossy().to_string();
        let out = run(&cli(false, Commands::Lookup { input, term: "RUST".into() })).unwrap();
        assert_eq!(out, "a.txt\nb.txt\n");
    }

    #[test]
    fn rank_orders_by_tf_idf() {
        let dir = corpus();
        let input = dir.path().to_string_lossy().to_string();
        let rank = Commands::Rank { input, term: "rust".into(), limit: 10 };
        let out = run(&cli(true, rank)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        let results = json["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["id"], "a.txt");
        assert_eq!(results[1]["id"], "b.txt");
        assert!(results[0]["score"].as_f64().unwrap() > results[1]["score"].as_f64().unwrap());
    }

    #[test]
    fn score_reports_unknown_document() {
        let dir = corpus();
        let input = dir.path().to_string_lossy().to_string();
        let score = Commands::Score { input, doc: "zzz.txt".into(), term: "rust".into() };
        let err = run(&cli(false, score)).unwrap_err();
        assert!(err.to_string().contains("unknown document"));
    }

    #[test]
    fn stats_counts_documents() {
        let dir = corpus();
        let input = dir.path().to_string_lossy().to_string();
        let out = run(&cli(true, Commands::Stats { input })).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["documents"], 3);
    }
}
