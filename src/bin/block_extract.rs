//! Extract UI blocks from model output and report what a renderer would get.
//!
//! Usage:
//!   block-extract --file transcript.txt --catalog catalogs/sample_components.json
//!   block-extract --chunk-size 4 < transcript.txt
//!
//! With `--chunk-size` the text is replayed as a stream of chunks, which also
//! records how long the extractor reported a pending block.

use anyhow::{Context, Result};
use blockfence::{
    BlockExtractor, CatalogCache, FileFetcher, MalformedBlock, MalformedBlockSink,
    validate_block,
};
use clap::Parser;
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncReadExt;

#[derive(Parser, Debug)]
#[command(name = "block-extract")]
#[command(about = "Extract and validate fenced UI component blocks")]
struct Cli {
    /// Input text file; reads stdin when omitted.
    #[arg(long)]
    file: Option<PathBuf>,
    /// Catalog to validate extracted blocks against.
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Replay the input in chunks of this many characters.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    chunk_size: Option<u64>,
    /// Debug logging for blockfence when BLOCKFENCE_LOG is unset.
    #[arg(long, short)]
    verbose: bool,
}

// Logs like the default sink, but keeps the drops for the report.
#[derive(Default)]
struct ReportSink {
    dropped: Vec<MalformedBlock>,
}

impl MalformedBlockSink for ReportSink {
    fn malformed(&mut self, block: MalformedBlock) {
        tracing::warn!(reason = %block.reason, "dropping malformed ui block");
        self.dropped.push(block);
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    blockfence::logging::init(cli.verbose);

    let input = read_input(cli.file.as_ref()).await?;
    let mut extractor = BlockExtractor::with_sink(ReportSink::default());
    let mut pending_chunks = 0usize;
    match cli.chunk_size {
        Some(size) => {
            let chars: Vec<char> = input.chars().collect();
            for chunk in chars.chunks(size as usize) {
                extractor.push(&chunk.iter().collect::<String>());
                if extractor.is_pending() {
                    pending_chunks += 1;
                }
            }
        }
        None => extractor.push(&input),
    }
    let pending_at_end = extractor.is_pending();
    extractor.finish();

    let catalog = match &cli.catalog {
        Some(path) => {
            let cache = CatalogCache::new(Arc::new(FileFetcher::new()));
            Some(cache.load(&path.to_string_lossy()).await?)
        }
        None => None,
    };

    let blocks: Vec<Value> = extractor
        .completed_blocks()
        .iter()
        .map(|raw| match &catalog {
            None => json!({
                "source_span": raw.source_span,
                "component_id": raw.component_id,
                "payload": raw.payload,
            }),
            Some(catalog) => match validate_block(raw, catalog) {
                Ok(valid) => json!({
                    "source_span": raw.source_span,
                    "component_id": raw.component_id,
                    "status": "valid",
                    "render_path": valid.descriptor.render_path,
                    "props": valid.props(),
                }),
                Err(rejection) => json!({
                    "source_span": raw.source_span,
                    "component_id": raw.component_id,
                    "status": "rejected",
                    "message": rejection.to_string(),
                    "rejection": rejection,
                }),
            },
        })
        .collect();

    let report = json!({
        "display_text": extractor.display_text(),
        "pending_at_end": pending_at_end,
        "pending_chunks": pending_chunks,
        "blocks": blocks,
        "dropped": extractor.sink().dropped,
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("serializing report")?
    );
    Ok(())
}

async fn read_input(file: Option<&PathBuf>) -> Result<String> {
    match file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading input file {}", path.display())),
        None => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("reading stdin for input text")?;
            Ok(buf)
        }
    }
}
