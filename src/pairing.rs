use std::fs;
use std::io::Read;

use camino::{Utf8Path, Utf8PathBuf};
use flate2::read::MultiGzDecoder;

use crate::app::SampleText;
use crate::error::BuildError;

/// Nucleotide-file extensions probed for each annotation table, in order.
const SEQUENCE_EXTENSIONS: [&str; 2] = ["fnn", "fnn.gz"];

/// One discovered sample: an annotation table plus its nucleotide source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplePair {
    pub basename: String,
    pub table_path: Utf8PathBuf,
    pub sequence_path: Utf8PathBuf,
}

/// Result of scanning an input directory.
#[derive(Debug, Default)]
pub struct Discovery {
    pub pairs: Vec<SamplePair>,
    /// Annotation tables with no nucleotide partner.
    pub unpaired: Vec<Utf8PathBuf>,
}

/// Scans `input_dir` for `*.tab` annotation tables and pairs each with a
/// same-basename nucleotide file. Pairs come back sorted by basename so
/// batch order, logs and the manifest are deterministic.
pub fn discover_pairs(input_dir: &Utf8Path) -> Result<Discovery, BuildError> {
    let entries = fs::read_dir(input_dir.as_std_path()).map_err(|err| BuildError::InputRead {
        path: input_dir.to_owned(),
        message: err.to_string(),
    })?;

    let mut discovery = Discovery::default();
    for entry in entries {
        let entry = entry.map_err(|err| BuildError::Filesystem(err.to_string()))?;
        let Ok(path) = Utf8PathBuf::from_path_buf(entry.path()) else {
            continue;
        };
        if !path.is_file() || path.extension() != Some("tab") {
            continue;
        }
        let Some(basename) = path.file_stem().map(str::to_string) else {
            continue;
        };
        match find_sequence_file(&path) {
            Some(sequence_path) => discovery.pairs.push(SamplePair {
                basename,
                table_path: path,
                sequence_path,
            }),
            None => discovery.unpaired.push(path),
        }
    }

    discovery.pairs.sort_by(|a, b| a.basename.cmp(&b.basename));
    discovery.unpaired.sort();
    Ok(discovery)
}

fn find_sequence_file(table_path: &Utf8Path) -> Option<Utf8PathBuf> {
    SEQUENCE_EXTENSIONS
        .iter()
        .map(|ext| table_path.with_extension(ext))
        .find(|candidate| candidate.as_std_path().is_file())
}

/// Reads a text input, transparently inflating `.gz` files.
pub fn read_input_text(path: &Utf8Path) -> Result<String, BuildError> {
    let bytes = fs::read(path.as_std_path()).map_err(|err| read_error(path, err.to_string()))?;
    if path.extension() == Some("gz") {
        let mut text = String::new();
        MultiGzDecoder::new(bytes.as_slice())
            .read_to_string(&mut text)
            .map_err(|err| read_error(path, err.to_string()))?;
        Ok(text)
    } else {
        String::from_utf8(bytes).map_err(|err| read_error(path, err.to_string()))
    }
}

/// Reads both files of a pair into the in-memory form the pipeline takes.
pub fn load_pair(pair: &SamplePair) -> Result<SampleText, BuildError> {
    Ok(SampleText {
        basename: pair.basename.clone(),
        hit_table: read_input_text(&pair.table_path)?,
        sequences: read_input_text(&pair.sequence_path)?,
    })
}

fn read_error(path: &Utf8Path, message: String) -> BuildError {
    BuildError::InputRead {
        path: path.to_owned(),
        message,
    }
}
