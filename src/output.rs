use std::io::{self, Write};

use serde::Serialize;

use crate::app::{ProgressEvent, ProgressSink, RunSummary};

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Log,
    Json,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_summary(summary: &RunSummary) -> io::Result<()> {
        Self::print_json(summary)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl ProgressSink for JsonOutput {
    fn event(&self, _event: ProgressEvent) {}
}

/// Reports progress through `tracing` at info level.
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn event(&self, event: ProgressEvent) {
        match event.elapsed {
            Some(elapsed) => tracing::info!(
                elapsed_s = elapsed.as_secs(),
                "{}",
                event.message
            ),
            None => tracing::info!("{}", event.message),
        }
    }
}

impl LogProgress {
    pub fn print_summary(summary: &RunSummary) {
        tracing::info!(
            entries = summary.stats.entries,
            enriched = summary.stats.entries_enriched,
            elapsed_ms = summary.elapsed_ms,
            "enriched {} into {}",
            summary.input,
            summary.output
        );
    }
}
