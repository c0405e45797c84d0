use std::io::{self, Write};

use serde::Serialize;
use tracing::{info, warn};

use crate::app::{EventSink, PipelineEvent, RunSummary};

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Text,
    Json,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_summary(summary: &RunSummary) -> io::Result<()> {
        Self::print_json(summary)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value)
            .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

/// Discards events; for callers that only need the returned records.
pub struct NullSink;

impl EventSink for NullSink {
    fn event(&self, _event: PipelineEvent) {}
}

/// Forwards pipeline events to the log stream. Logs go to stderr, so this
/// stays safe to combine with the JSON summary on stdout.
pub struct LogSink;

impl EventSink for LogSink {
    fn event(&self, event: PipelineEvent) {
        match event {
            PipelineEvent::PairStarted {
                basename,
                hits,
                retained,
            } => info!("{basename}: {hits} hits, {retained} retained"),
            PipelineEvent::SequenceMissing { family, query_id } => {
                warn!("{family}: sequence {query_id} not found in nucleotide source");
            }
            PipelineEvent::LengthMismatch {
                family,
                query_id,
                actual,
                expected,
            } => warn!("{family}: sequence {query_id} is {actual} nt, expected {expected}"),
            PipelineEvent::FamilyFallback { family } => {
                warn!("unrecognized family {family}, assigning fallback taxonomy");
            }
            PipelineEvent::PairFinished {
                basename,
                written,
                skipped,
            } => info!("{basename}: wrote {written} sequences, skipped {skipped} hits"),
        }
    }
}
