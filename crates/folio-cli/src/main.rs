//! folio command-line driver.
//!
//! Usage:
//!   # Print the welcome document
//!   folio show
//!
//!   # Print a saved document
//!   folio show --doc notes.json
//!
//!   # Replay an edit script and save the result
//!   folio run edits.txt --doc notes.json --out notes.json
//!
//! Logging goes to stderr; set `RUST_LOG=debug` to see every mutation.

mod script;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

use folio_editor::{Checklist, Document, EditorConfig, EditorSession, JsonFileSink, MemorySink, SaveSink};
use folio_types::BlockKind;

/// Block document editor driver.
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(about = "Inspect and script folio block documents")]
struct Args {
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Print a document as an indexed block listing
    Show {
        /// Saved document (JSON); the welcome document when omitted
        #[arg(long)]
        doc: Option<PathBuf>,

        /// Print JSON instead of the listing
        #[arg(long)]
        json: bool,
    },
    /// Replay an edit script against a document
    Run {
        /// Script file, one command per line
        script: PathBuf,

        /// Saved document (JSON); the welcome document when omitted
        #[arg(long)]
        doc: Option<PathBuf>,

        /// Editor config (RON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Where to save the result
        #[arg(long)]
        out: Option<PathBuf>,

        /// Print JSON instead of the listing
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match args.command {
        Cmd::Show { doc, json } => {
            let doc = load_document(doc.as_deref())?;
            print_document(&doc, json)
        }
        Cmd::Run {
            script,
            doc,
            config,
            out,
            json,
        } => {
            let config = match config {
                Some(path) => EditorConfig::load(&path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => EditorConfig::default(),
            };
            let doc = load_document(doc.as_deref())?;
            let source = std::fs::read_to_string(&script)
                .with_context(|| format!("reading script {}", script.display()))?;
            let steps = script::parse(&source)?;

            let mut session = EditorSession::new(doc, config)?;
            let mut sink: Box<dyn SaveSink> = match &out {
                Some(path) => Box::new(JsonFileSink::new(path)),
                None => Box::new(MemorySink::new()),
            };

            script::run(&steps, &mut session, sink.as_mut())?;
            if let Some(path) = &out {
                session
                    .save_now(sink.as_mut())
                    .with_context(|| format!("saving {}", path.display()))?;
                tracing::info!(path = %path.display(), blocks = session.blocks().len(), "saved");
            }

            print_document(session.document(), json)
        }
    }
}

fn load_document(path: Option<&Path>) -> Result<Document> {
    match path {
        Some(path) => {
            let state = JsonFileSink::load(path).with_context(|| format!("loading {}", path.display()))?;
            Ok(state.into_document())
        }
        None => Ok(Document::welcome()),
    }
}

fn print_document(doc: &Document, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(doc)?);
        return Ok(());
    }

    println!("{}", if doc.title.is_empty() { "(untitled)" } else { &doc.title });
    for (index, block) in doc.blocks.iter().enumerate() {
        let marker = if block.is_editing { '*' } else { ' ' };
        println!("{marker}{index:>3} [{}] {}", block.kind.label(), block.id.short());
        for line in render_content(block.kind, &block.content).lines() {
            println!("       {line}");
        }
    }
    Ok(())
}

fn render_content(kind: BlockKind, content: &str) -> String {
    match kind {
        BlockKind::Checklist => {
            let list = Checklist::parse(content);
            let mut out = format!("{}/{} done ({}%)\n", list.completed_count(), list.len(), list.progress_percent());
            for todo in &list.todos {
                let mark = if todo.completed { 'x' } else { ' ' };
                out.push_str(&format!("[{mark}] {}\n", todo.text));
            }
            out
        }
        _ => content.to_string(),
    }
}
