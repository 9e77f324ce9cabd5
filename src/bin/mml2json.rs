//! MML to JSON note trace

use clap::Parser;
use psgmml::trace::trace_source;
use psgmml::MmlSource;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(name = "mml2json")]
#[command(version = "0.1.0")]
#[command(about = "Dump the notes an MML file plays as JSON", long_about = None)]
struct Args {
    /// Input MML file (plain or gzip)
    input: PathBuf,

    /// Output JSON file (writes to stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Note events to trace per channel
    #[arg(short, long, default_value_t = 32)]
    notes: usize,

    /// Output compact JSON (default is pretty-printed)
    #[arg(short, long)]
    compact: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(Level::WARN)
        .with_writer(std::io::stderr)
        .compact()
        .finish()
        .init();

    let source = MmlSource::load(&args.input)?;
    let trace = trace_source(&source, args.notes);

    let json_string = if args.compact {
        serde_json::to_string(&trace)?
    } else {
        serde_json::to_string_pretty(&trace)?
    };

    match args.output {
        Some(path) => {
            let mut file = File::create(path)?;
            file.write_all(json_string.as_bytes())?;
            file.write_all(b"\n")?;
        }
        None => {
            println!("{}", json_string);
        }
    }

    Ok(())
}
