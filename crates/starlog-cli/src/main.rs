//! CLI runner for the starlog batch ETL.
//!
//! One invocation performs one full rebuild: read the song catalog and the
//! session logs under `--input-data`, derive the star schema, and write the
//! five Parquet tables under `--output-data`.

mod error;

use std::error::Error as _;
use std::time::Instant;

use clap::Parser;
use snafu::ResultExt;
use starlog_core::pipeline;
use starlog_core::storage::DataLocation;

use crate::error::{CliResult, InvalidInputSnafu, InvalidOutputSnafu, RunPipelineSnafu};

#[derive(Debug, Parser)]
#[command(name = "starlog", about = "Rebuild the songplay star schema from raw NDJSON logs")]
struct Cli {
    /// Input root holding song_data/ and log_data/
    #[arg(long = "input-data", env = "STARLOG_INPUT_DATA")]
    input_data: String,

    /// Output root for the five Parquet tables (contents are replaced)
    #[arg(long = "output-data", env = "STARLOG_OUTPUT_DATA")]
    output_data: String,

    /// Print elapsed time for the run
    #[arg(long, default_value_t = false)]
    timing: bool,
}

async fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let start = Instant::now();

    let input = DataLocation::parse(&cli.input_data).context(InvalidInputSnafu {
        location: cli.input_data.clone(),
    })?;
    let output = DataLocation::parse(&cli.output_data).context(InvalidOutputSnafu {
        location: cli.output_data.clone(),
    })?;

    let report = pipeline::run(&input, &output)
        .await
        .context(RunPipelineSnafu)?;

    println!(
        "Wrote {} songs, {} artists, {} users, {} time rows, {} songplays",
        report.songs, report.artists, report.users, report.time_rows, report.songplays
    );
    if report.catalog_skipped + report.events_skipped > 0 {
        println!(
            "Skipped {} catalog records and {} log records",
            report.catalog_skipped, report.events_skipped
        );
    }
    if cli.timing {
        println!("Elapsed: {} ms", start.elapsed().as_millis());
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run().await {
        eprintln!("{e}");
        let mut cause = e.source();
        while let Some(c) = cause {
            eprintln!("  caused by: {c}");
            cause = c.source();
        }
        std::process::exit(1);
    }
}
