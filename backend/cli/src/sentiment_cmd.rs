//! `ambassador sentiment ...`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;

use ambassador_config::AmbassadorConfig;
use ambassador_sentiment::DailySummary;

use crate::runtime;
use crate::terminal_output::{note_info, note_success, render_table, Column};

#[derive(Subcommand)]
pub enum SentimentCommands {
    /// Export every scored message as CSV
    Export {
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Per-day sentiment summary
    Daily,
}

pub async fn run(config: &AmbassadorConfig, cmd: SentimentCommands) -> Result<()> {
    let aggregator = runtime::sentiment_aggregator(config)?;
    match cmd {
        SentimentCommands::Export { out } => {
            let csv = aggregator.export_csv().await?;
            match out {
                Some(path) => {
                    tokio::fs::write(&path, csv)
                        .await
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    note_success(&format!("Sentiment log exported to {}", path.display()));
                }
                None => print!("{csv}"),
            }
        }
        SentimentCommands::Daily => {
            let days = aggregator.daily_summaries().await?;
            if days.is_empty() {
                note_info("No sentiment records yet.");
            } else {
                print!("{}", daily_table(&days));
            }
        }
    }
    Ok(())
}

fn daily_table(days: &[DailySummary]) -> String {
    let columns = [
        Column::left("Date"),
        Column::right("Positive"),
        Column::right("Negative"),
        Column::right("Neutral"),
        Column::right("Total"),
        Column::right("Mean"),
        Column::left("Dominant"),
    ];
    let rows: Vec<Vec<String>> = days
        .iter()
        .map(|day| {
            let s = &day.summary;
            vec![
                day.date.to_string(),
                s.positive.to_string(),
                s.negative.to_string(),
                s.neutral.to_string(),
                s.total.to_string(),
                format!("{:.2}", s.mean_score),
                s.dominant.map(|l| l.to_string()).unwrap_or_else(|| "-".into()),
            ]
        })
        .collect();
    render_table(&columns, &rows)
}
