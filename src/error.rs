use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum BuildError {
    #[error("hit table line {line}: expected 10 tab-separated fields, found {found}")]
    MalformedHitLine { line: usize, found: usize },

    #[error("hit table line {line}: invalid {field} value {value:?}")]
    InvalidHitField {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("hit table line {line}: span {start}..{end} does not fit query length {length}")]
    InvalidHitCoordinates {
        line: usize,
        start: u32,
        end: u32,
        length: u32,
    },

    #[error("{family}: sequence {query_id} not found in nucleotide source")]
    SequenceNotFound { family: String, query_id: String },

    #[error("{family}: sequence {query_id} is {actual} nt, expected {expected}")]
    LengthMismatch {
        family: String,
        query_id: String,
        actual: usize,
        expected: usize,
    },

    #[error("unrecognized family id: {0}")]
    UnrecognizedFamily(String),

    #[error("level table has no header row")]
    EmptyLevelTable,

    #[error("level table has no {0} column")]
    MissingCodeColumn(String),

    #[error("level table line {line}: {found} cells but header has {columns}")]
    MalformedLevelRow {
        line: usize,
        found: usize,
        columns: usize,
    },

    #[error("no nucleotide file found for table {0}")]
    MissingSequenceFile(Utf8PathBuf),

    #[error("failed to read {path}: {message}")]
    InputRead { path: Utf8PathBuf, message: String },

    #[error("filesystem error: {0}")]
    Filesystem(String),
}
