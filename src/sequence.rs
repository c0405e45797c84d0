use std::collections::HashMap;

use crate::error::BuildError;
use crate::hits::HitRecord;

/// One-time index from gene id to its full nucleotide sequence.
///
/// Built once per nucleotide source file so that per-hit lookups are O(1)
/// instead of rescanning the whole text for every hit.
#[derive(Debug, Default)]
pub struct SequenceIndex {
    entries: HashMap<String, String>,
}

impl SequenceIndex {
    /// Walks `>id` records in the text, concatenating each record's sequence
    /// lines with newlines removed. The id is the first whitespace-delimited
    /// token of the header; on duplicate ids the first record wins. Text
    /// before the first header is ignored.
    pub fn build(text: &str) -> Self {
        let mut entries: HashMap<String, String> = HashMap::new();
        let mut current: Option<(String, String)> = None;

        for line in text.lines() {
            if let Some(header) = line.strip_prefix('>') {
                if let Some((id, seq)) = current.take() {
                    entries.entry(id).or_insert(seq);
                }
                let id = header.split_whitespace().next().unwrap_or("").to_string();
                current = Some((id, String::new()));
            } else if let Some((_, seq)) = current.as_mut() {
                seq.push_str(line.trim_end());
            }
        }
        if let Some((id, seq)) = current.take() {
            entries.entry(id).or_insert(seq);
        }

        Self { entries }
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }

    /// Looks up a hit's gene, failing with the family/gene pair so the
    /// caller can skip the hit and log which annotation lost its sequence.
    pub fn lookup(&self, hit: &HitRecord) -> Result<&str, BuildError> {
        self.get(&hit.query_id)
            .ok_or_else(|| BuildError::SequenceNotFound {
                family: hit.family_name().to_string(),
                query_id: hit.query_id.clone(),
            })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
