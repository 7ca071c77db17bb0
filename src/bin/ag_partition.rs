//! Partitioner command-line tool.
//!
//! Reads a graph document, partitions it, and writes the updated graph (or,
//! with `--dry-run`, the plan) as JSON on stdout. Logs go to stderr.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `RUST_LOG`: Log level filter (default: info)
//! - `LOG_FORMAT`: "json" for structured logs, "pretty" for development (default: json)
//!
//! ## Usage
//!
//! ```bash
//! ag_partition graph.json 'boundaryLayerId=turn&tokenLayerId=word&partitionSize=5&destinationLayerId=partition'
//! ag_partition graph.json params.json --dry-run
//! ```
//!
//! The parameters argument is either a query string or a path to a JSON
//! object of parameters.

use std::path::Path;
use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ag_partitioner::{GraphDocument, InMemoryGraphStore, Partitioner, TaskParameters};

/// Initialize the tracing subscriber with JSON or pretty format
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "ag_partition=info,ag_partitioner=info".into());

    if log_format == "pretty" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true)
                    .flatten_event(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

struct Args {
    graph: String,
    params: String,
    dry_run: bool,
}

fn parse_args() -> Result<Args, String> {
    let mut positional = Vec::new();
    let mut dry_run = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--dry-run" | "-n" => dry_run = true,
            "--help" | "-h" => return Err(usage()),
            _ => positional.push(arg),
        }
    }
    match <[String; 2]>::try_from(positional) {
        Ok([graph, params]) => Ok(Args { graph, params, dry_run }),
        Err(_) => Err(usage()),
    }
}

fn usage() -> String {
    "usage: ag_partition <graph.json> <query-string | params.json> [--dry-run]".to_string()
}

fn load_params(arg: &str) -> Result<TaskParameters, Box<dyn std::error::Error>> {
    if arg.ends_with(".json") && Path::new(arg).exists() {
        let text = std::fs::read_to_string(arg)?;
        return Ok(serde_json::from_str(&text)?);
    }
    Ok(TaskParameters::from_query_string(arg))
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(&args.graph)?;
    let document: GraphDocument = serde_json::from_str(&text)?;
    let mut store = InMemoryGraphStore::from_document(document)?;
    let params = load_params(&args.params)?;

    let partitioner = Partitioner::configure(&params, store.schema_mut())?;
    info!(
        required = ?partitioner.required_layers(),
        output = ?partitioner.output_layers(),
        "Partitioner configured"
    );

    let stdout = std::io::stdout();
    if args.dry_run {
        let plans = partitioner.plan(&store)?;
        serde_json::to_writer_pretty(stdout.lock(), &plans)?;
    } else {
        let report = partitioner.transform(&mut store)?;
        info!(
            graph_id = %report.graph_id,
            config_hash = %report.config_hash,
            excluded = ?report.excluded,
            created = report.annotations_created(),
            "Run finished"
        );
        serde_json::to_writer_pretty(stdout.lock(), &store.to_document())?;
    }
    println!();
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();

    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{}", message);
            return ExitCode::from(2);
        }
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Partitioning failed");
            ExitCode::FAILURE
        }
    }
}
