//! Derives the `PersonalityTrait` column from TIPI responses (`TIPI1`..`TIPI10`)
//! and writes the table back out.

use anyhow::{Context, Result};
use clap::Parser;
use team_former::adapters::csv_table;
use team_former::domain::model::COLUMN_PERSONALITY;
use team_former::domain::services::personality;
use team_former::utils::logger;

#[derive(Debug, Parser)]
#[command(name = "score_personality")]
#[command(about = "Label participants from their TIPI questionnaire answers")]
struct Args {
    /// Participant CSV with TIPI1..TIPI10 columns
    #[arg(long, default_value = "contestants.csv")]
    input: String,

    /// Destination CSV; defaults to overwriting the input
    #[arg(long)]
    output: Option<String>,

    /// Recompute labels even when the column already has values
    #[arg(long)]
    force: bool,

    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let bytes = tokio::fs::read(&args.input)
        .await
        .with_context(|| format!("reading {}", args.input))?;
    let mut table = csv_table::read_table(&bytes)?;

    if args.force {
        if let Some(column) = table.column_index(COLUMN_PERSONALITY) {
            for row in table.rows.iter_mut() {
                row[column].clear();
            }
        }
    }

    if !personality::fill_missing_traits(&mut table)? {
        tracing::info!("{} already filled in {}; nothing to do", COLUMN_PERSONALITY, args.input);
        return Ok(());
    }

    let output = args.output.as_deref().unwrap_or(&args.input);
    let data = csv_table::write_table(&table)?;
    tokio::fs::write(output, data)
        .await
        .with_context(|| format!("writing {}", output))?;

    println!("✅ Labelled {} participants → {}", table.len(), output);
    Ok(())
}
