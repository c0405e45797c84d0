use serde::Serialize;

use crate::codon::extract_coding_region;
use crate::domain::record_id;
use crate::error::BuildError;
use crate::hits::{dedup_by_coverage, parse_hit_table};
use crate::sequence::SequenceIndex;
use crate::taxonomy::{FALLBACK_TAXONOMY, LevelTable};

#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Keep every hit per gene instead of collapsing to the best-covered one.
    pub keep_multiple: bool,
}

/// One sample's input texts, already read by the caller. The pipeline never
/// touches the filesystem.
#[derive(Debug, Clone)]
pub struct SampleText {
    pub basename: String,
    pub hit_table: String,
    pub sequences: String,
}

/// One `>{id}` record destined for the sequence output file.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceRecord {
    pub id: String,
    pub nucleotides: String,
}

/// One `{id}\t{taxonomy}` record destined for the taxonomy output file.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxonomyRecord {
    pub id: String,
    pub taxonomy: String,
}

/// Everything produced for one sample pair. The two record sets share ids
/// but may differ in membership: extraction can skip a hit while taxonomy
/// resolution never does.
#[derive(Debug, Clone)]
pub struct PairOutput {
    pub basename: String,
    pub sequence_records: Vec<SequenceRecord>,
    pub taxonomy_records: Vec<TaxonomyRecord>,
    pub report: SampleReport,
}

/// Per-sample statistics carried into the manifest and run summary.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SampleReport {
    pub basename: String,
    pub hits_parsed: usize,
    pub hits_retained: usize,
    pub sequences_written: usize,
    pub taxonomy_written: usize,
    pub skipped_missing_sequence: usize,
    pub skipped_length_mismatch: usize,
    pub fallback_families: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SampleReport {
    /// Report for a pair that failed before producing output.
    pub fn failed(basename: &str, error: &BuildError) -> Self {
        Self {
            basename: basename.to_string(),
            error: Some(error.to_string()),
            ..Self::default()
        }
    }
}

/// Whole-run roll-up, printed by the CLI and embedded in the manifest.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub pairs_processed: usize,
    pub pairs_failed: usize,
    pub samples: Vec<SampleReport>,
}

impl RunSummary {
    pub fn push(&mut self, report: SampleReport) {
        if report.error.is_some() {
            self.pairs_failed += 1;
        } else {
            self.pairs_processed += 1;
        }
        self.samples.push(report);
    }
}

/// Structured diagnostics emitted while a pair is processed. The sink is
/// injected so the caller decides where they go: log lines in the CLI,
/// capture buffers in tests.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    PairStarted {
        basename: String,
        hits: usize,
        retained: usize,
    },
    SequenceMissing {
        family: String,
        query_id: String,
    },
    LengthMismatch {
        family: String,
        query_id: String,
        actual: usize,
        expected: usize,
    },
    FamilyFallback {
        family: String,
    },
    PairFinished {
        basename: String,
        written: usize,
        skipped: usize,
    },
}

pub trait EventSink {
    fn event(&self, event: PipelineEvent);
}

/// The per-pair pipeline: parse, deduplicate, index, extract, resolve.
pub struct App {
    level_table: LevelTable,
    options: BuildOptions,
}

impl App {
    pub fn new(level_table: LevelTable, options: BuildOptions) -> Self {
        Self {
            level_table,
            options,
        }
    }

    /// Processes one (hit table, nucleotide source) pair.
    ///
    /// A malformed hit table is fatal for the pair. Per-hit failures are
    /// reported through `sink` and skip only that hit's sequence record;
    /// its taxonomy record is still emitted (with the fallback string when
    /// the family does not resolve). Hits are processed strictly in working
    /// order because output ids are positional.
    pub fn process_pair(
        &self,
        sample: &SampleText,
        sink: &dyn EventSink,
    ) -> Result<PairOutput, BuildError> {
        let parsed = parse_hit_table(&sample.hit_table)?;
        let hits_parsed = parsed.len();
        let working = dedup_by_coverage(parsed, self.options.keep_multiple);

        sink.event(PipelineEvent::PairStarted {
            basename: sample.basename.clone(),
            hits: hits_parsed,
            retained: working.len(),
        });

        let index = SequenceIndex::build(&sample.sequences);

        let mut report = SampleReport {
            basename: sample.basename.clone(),
            hits_parsed,
            hits_retained: working.len(),
            ..SampleReport::default()
        };
        let mut sequence_records = Vec::new();
        let mut taxonomy_records = Vec::new();

        for (idx, hit) in working.iter().enumerate() {
            let id = record_id(&sample.basename, idx, &hit.query_id);

            let extracted = index
                .lookup(hit)
                .and_then(|sequence| extract_coding_region(hit, sequence));
            match extracted {
                Ok(nucleotides) => sequence_records.push(SequenceRecord {
                    id: id.clone(),
                    nucleotides,
                }),
                Err(BuildError::SequenceNotFound { family, query_id }) => {
                    report.skipped_missing_sequence += 1;
                    sink.event(PipelineEvent::SequenceMissing { family, query_id });
                }
                Err(BuildError::LengthMismatch {
                    family,
                    query_id,
                    actual,
                    expected,
                }) => {
                    report.skipped_length_mismatch += 1;
                    sink.event(PipelineEvent::LengthMismatch {
                        family,
                        query_id,
                        actual,
                        expected,
                    });
                }
                Err(other) => return Err(other),
            }

            let taxonomy = match self.level_table.resolve(hit.family_name()) {
                Ok(taxonomy) => taxonomy,
                Err(_) => {
                    report.fallback_families += 1;
                    sink.event(PipelineEvent::FamilyFallback {
                        family: hit.family_name().to_string(),
                    });
                    FALLBACK_TAXONOMY.to_string()
                }
            };
            taxonomy_records.push(TaxonomyRecord { id, taxonomy });
        }

        report.sequences_written = sequence_records.len();
        report.taxonomy_written = taxonomy_records.len();

        sink.event(PipelineEvent::PairFinished {
            basename: sample.basename.clone(),
            written: report.sequences_written,
            skipped: report.skipped_missing_sequence + report.skipped_length_mismatch,
        });

        Ok(PairOutput {
            basename: sample.basename.clone(),
            sequence_records,
            taxonomy_records,
            report,
        })
    }
}
