//! Validate a component catalog and list its components.
//!
//! Usage:
//!   catalog-check --file catalogs/sample_components.json
//!   catalog-check --examples
//!
//! `--examples` also validates each component's own example payload against
//! its input schema.

use anyhow::{Result, bail};
use blockfence::{Catalog, DEFAULT_CATALOG_PATH, RawBlock, validate_block};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "catalog-check")]
#[command(about = "Validate a component catalog document")]
struct Cli {
    /// Catalog file; defaults to the bundled sample catalog.
    #[arg(long, default_value = DEFAULT_CATALOG_PATH)]
    file: PathBuf,
    /// Validate every component's example payload too.
    #[arg(long)]
    examples: bool,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    blockfence::logging::init(false);

    let catalog = Catalog::load(&cli.file)?;
    println!("catalog {} ({} components)", catalog.version(), catalog.len());

    let mut failures = 0usize;
    for (idx, descriptor) in catalog.components().enumerate() {
        let mut line = format!(
            "{}\t{}\t{}",
            descriptor.id, descriptor.category, descriptor.render_path
        );
        if cli.examples {
            match &descriptor.example {
                None => line.push_str("\tno example"),
                Some(example) => {
                    let block = RawBlock {
                        component_id: descriptor.id.0.clone(),
                        payload: example.clone(),
                        source_span: idx,
                    };
                    match validate_block(&block, &catalog) {
                        Ok(_) => line.push_str("\texample ok"),
                        Err(rejection) => {
                            failures += 1;
                            line.push_str(&format!("\texample invalid: {rejection}"));
                        }
                    }
                }
            }
        }
        println!("{line}");
    }

    if failures > 0 {
        bail!("{failures} component example(s) failed validation");
    }
    Ok(())
}
