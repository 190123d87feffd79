//! load-mold: list or print the types declared in a Go source file

use std::path::PathBuf;
use std::process;

use anyhow::{anyhow, Context};
use clap::Parser;

use typemold::describe::{describe, summarize};
use typemold::load_file;

/// Print the types declared in a Go source file
#[derive(Parser, Debug)]
#[command(name = "load-mold")]
#[command(version)]
#[command(about = "Load the type declarations of a Go source file")]
struct Cli {
    /// Go source file
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Print this type in full instead of listing every type
    #[arg(value_name = "TYPE")]
    type_name: Option<String>,

    /// Emit JSON
    #[arg(long)]
    json: bool,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let types = load_file(&cli.file)
        .with_context(|| format!("failed to load types from {}", cli.file.display()))?;

    match &cli.type_name {
        None if cli.json => {
            println!("{}", serde_json::to_string_pretty(&summarize(&types))?);
        }
        None => {
            for summary in summarize(&types) {
                println!("{}", summary);
            }
        }
        Some(name) => {
            let ty = types
                .get(name)
                .ok_or_else(|| anyhow!("no type named {} in {}", name, cli.file.display()))?;
            let report = describe(ty.as_ref()).with_context(|| format!("failed to describe {}", name))?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report);
            }
        }
    }
    Ok(())
}
