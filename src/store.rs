use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use tempfile::Builder;

use crate::app::{PairOutput, RunSummary, SequenceRecord, TaxonomyRecord};
use crate::error::BuildError;

/// On-disk layout of one build run: `{root}/{basename}.fasta` and
/// `{root}/{basename}.tax` per sample, plus `manifest.json` describing the
/// whole run.
#[derive(Debug, Clone)]
pub struct OutputStore {
    root: Utf8PathBuf,
}

impl OutputStore {
    pub fn new(root: Utf8PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn ensure_root(&self) -> Result<(), BuildError> {
        fs::create_dir_all(self.root.as_std_path())
            .map_err(|err| BuildError::Filesystem(err.to_string()))
    }

    pub fn fasta_path(&self, basename: &str) -> Utf8PathBuf {
        self.root.join(format!("{basename}.fasta"))
    }

    pub fn tax_path(&self, basename: &str) -> Utf8PathBuf {
        self.root.join(format!("{basename}.tax"))
    }

    pub fn manifest_path(&self) -> Utf8PathBuf {
        self.root.join("manifest.json")
    }

    /// Renders and writes both artifact files for one pair, replacing any
    /// file a previous run left at the same path. An empty record set still
    /// produces an (empty) file.
    pub fn write_pair(&self, output: &PairOutput) -> Result<(), BuildError> {
        let fasta = render_fasta(&output.sequence_records);
        let tax = render_tax(&output.taxonomy_records);
        write_bytes_atomic(&self.fasta_path(&output.basename), fasta.as_bytes())?;
        write_bytes_atomic(&self.tax_path(&output.basename), tax.as_bytes())?;
        Ok(())
    }

    pub fn write_manifest(&self, manifest: &RunManifest) -> Result<(), BuildError> {
        let content = serde_json::to_vec_pretty(manifest)
            .map_err(|err| BuildError::Filesystem(err.to_string()))?;
        write_bytes_atomic(&self.manifest_path(), &content)
    }
}

/// `manifest.json` written at the output root after a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunManifest {
    pub tool: String,
    pub generated_at: String,
    #[serde(flatten)]
    pub summary: RunSummary,
}

impl RunManifest {
    pub fn new(summary: RunSummary) -> Self {
        Self {
            tool: format!("cazy-db/{}", env!("CARGO_PKG_VERSION")),
            generated_at: iso_timestamp(),
            summary,
        }
    }
}

fn iso_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn render_fasta(records: &[SequenceRecord]) -> String {
    let mut text = String::new();
    for record in records {
        text.push('>');
        text.push_str(&record.id);
        text.push('\n');
        text.push_str(&record.nucleotides);
        text.push('\n');
    }
    text
}

fn render_tax(records: &[TaxonomyRecord]) -> String {
    let mut text = String::new();
    for record in records {
        text.push_str(&record.id);
        text.push('\t');
        text.push_str(&record.taxonomy);
        text.push('\n');
    }
    text
}

fn write_bytes_atomic(path: &Utf8Path, content: &[u8]) -> Result<(), BuildError> {
    let parent = path
        .parent()
        .ok_or_else(|| BuildError::Filesystem("invalid output path".to_string()))?;
    fs::create_dir_all(parent.as_std_path())
        .map_err(|err| BuildError::Filesystem(err.to_string()))?;
    let temp = Builder::new()
        .prefix("cazy-db")
        .tempfile_in(parent.as_std_path())
        .map_err(|err| BuildError::Filesystem(err.to_string()))?;
    fs::write(temp.path(), content).map_err(|err| BuildError::Filesystem(err.to_string()))?;
    if path.as_std_path().exists() {
        fs::remove_file(path.as_std_path())
            .map_err(|err| BuildError::Filesystem(err.to_string()))?;
    }
    temp.persist(path.as_std_path())
        .map_err(|err| BuildError::Filesystem(err.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_paths() {
        let store = OutputStore::new(Utf8PathBuf::from("/tmp/cazy-out"));
        assert!(store.fasta_path("sample1").ends_with("sample1.fasta"));
        assert!(store.tax_path("sample1").ends_with("sample1.tax"));
        assert!(store.manifest_path().ends_with("manifest.json"));
    }

    #[test]
    fn renders_single_line_records() {
        let fasta = render_fasta(&[SequenceRecord {
            id: "s_cazy_0000_geneA".to_string(),
            nucleotides: "ATGAAA".to_string(),
        }]);
        assert_eq!(fasta, ">s_cazy_0000_geneA\nATGAAA\n");

        let tax = render_tax(&[TaxonomyRecord {
            id: "s_cazy_0000_geneA".to_string(),
            taxonomy: "L1_A;L4_GH5".to_string(),
        }]);
        assert_eq!(tax, "s_cazy_0000_geneA\tL1_A;L4_GH5\n");
    }

    #[test]
    fn renders_empty_record_sets_as_empty_text() {
        assert_eq!(render_fasta(&[]), "");
        assert_eq!(render_tax(&[]), "");
    }
}
