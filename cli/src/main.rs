use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use clap::Parser;
use tracing::info;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use narra_genai::GeminiClient;
use narra_index::NarrativeRecord;
use narra_index::SearchIndex;
use narra_index::answer_query;

/// Narrative semantic search
///
/// Retrieves the most relevant narrative for a free-text sociological
/// question and asks Gemini for a grounded explanation.
#[derive(Debug, Parser)]
#[clap(name = "narra", version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[clap(subcommand)]
    subcommand: Subcommand,
}

#[derive(Debug, clap::Subcommand)]
enum Subcommand {
    /// Answer a question from the narrative corpus.
    #[clap(visible_alias = "q")]
    Query(QueryCommand),

    /// Build a JSON embedding index from a folder of .txt narratives.
    Build(BuildCommand),
}

#[derive(Debug, Parser)]
struct QueryCommand {
    /// Path to the JSON embedding index.
    #[clap(long, default_value = "embeddingDatabase.json")]
    index: PathBuf,

    /// The question or concept to search for.
    #[clap(required = true, num_args = 1..)]
    question: Vec<String>,
}

#[derive(Debug, Parser)]
struct BuildCommand {
    /// Folder containing the .txt narratives.
    dir: PathBuf,

    /// Output path for the JSON index.
    #[clap(long, default_value = "embeddingDatabase.json")]
    out: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.subcommand {
        Subcommand::Query(cmd) => run_query(cmd),
        Subcommand::Build(cmd) => run_build(cmd),
    }
}

fn run_query(cmd: QueryCommand) -> Result<()> {
    let question = cmd.question.join(" ");

    let index = SearchIndex::load(&cmd.index)
        .with_context(|| format!("loading search index from {}", cmd.index.display()))?;
    info!(records = index.len(), "search index loaded");

    let client = GeminiClient::from_env().context("configuring Gemini client")?;
    let answer =
        answer_query(&client, &client, &index, &question).context("answering query")?;

    println!("{}", answer.text);
    println!("\n(similarity score: {:.4})", answer.score);
    Ok(())
}

fn run_build(cmd: BuildCommand) -> Result<()> {
    let texts = read_narratives(&cmd.dir)
        .with_context(|| format!("reading narratives from {}", cmd.dir.display()))?;
    if texts.is_empty() {
        bail!("no .txt narratives found in {}", cmd.dir.display());
    }
    info!(count = texts.len(), "embedding narratives");

    let client = GeminiClient::from_env().context("configuring Gemini client")?;
    let bodies: Vec<String> = texts.iter().map(|(_, t)| t.clone()).collect();
    let vectors = client
        .embed_batch(&bodies)
        .context("embedding narratives")?;

    let records: Vec<NarrativeRecord> = texts
        .into_iter()
        .zip(vectors)
        .map(|((file_name, text), embedding)| NarrativeRecord {
            text,
            embedding: Some(embedding),
            file_name: Some(file_name),
        })
        .collect();

    let json = serde_json::to_string_pretty(&records).context("serializing index")?;
    std::fs::write(&cmd.out, json)
        .with_context(|| format!("writing index to {}", cmd.out.display()))?;
    info!(out = %cmd.out.display(), records = records.len(), "index written");
    Ok(())
}

/// Read every `*.txt` file under `dir` as `(file name, contents)`, sorted
/// by file name so index order is reproducible. Invalid UTF-8 is replaced
/// rather than failing the whole build.
fn read_narratives(dir: &Path) -> Result<Vec<(String, String)>> {
    let mut out = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("txt") {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let bytes = std::fs::read(&path)?;
        let text = String::from_utf8_lossy(&bytes).into_owned();
        if text.trim().is_empty() {
            warn!(file = name, "skipping empty narrative");
            continue;
        }
        out.push((name.to_string(), text));
    }
    out.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(out)
}
