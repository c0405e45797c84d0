//! dbCAN annotation-table parsing and per-gene hit selection.
//!
//! The table is tab-delimited with no header and exactly 10 columns:
//!
//! | # | column       | type  |
//! |---|--------------|-------|
//! | 1 | family model | str   |
//! | 2 | model length | u32   |
//! | 3 | query id     | str   |
//! | 4 | query length | u32 (amino acids) |
//! | 5 | e-value      | f64   |
//! | 6 | model start  | u32   |
//! | 7 | model end    | u32   |
//! | 8 | query start  | u32 (1-based, inclusive) |
//! | 9 | query end    | u32 (1-based, inclusive) |
//! | 10| coverage     | f64   |

use std::collections::HashMap;
use std::str::FromStr;

use crate::error::BuildError;

/// One annotation hit, read-only after parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct HitRecord {
    pub family: String,
    pub hmm_length: u32,
    pub query_id: String,
    pub query_length: u32,
    pub e_value: f64,
    pub hmm_start: u32,
    pub hmm_end: u32,
    pub query_start: u32,
    pub query_end: u32,
    pub coverage: f64,
}

impl HitRecord {
    /// Family id with a trailing model-file suffix removed, `GH5.hmm` → `GH5`.
    pub fn family_name(&self) -> &str {
        self.family.strip_suffix(".hmm").unwrap_or(&self.family)
    }

    /// Parses one table line. `line_no` is 1-based and only used in errors.
    pub fn parse_line(line: &str, line_no: usize) -> Result<Self, BuildError> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 10 {
            return Err(BuildError::MalformedHitLine {
                line: line_no,
                found: fields.len(),
            });
        }

        let record = HitRecord {
            family: fields[0].to_string(),
            hmm_length: parse_field(fields[1], "model length", line_no)?,
            query_id: fields[2].to_string(),
            query_length: parse_field(fields[3], "query length", line_no)?,
            e_value: parse_field(fields[4], "e-value", line_no)?,
            hmm_start: parse_field(fields[5], "model start", line_no)?,
            hmm_end: parse_field(fields[6], "model end", line_no)?,
            query_start: parse_field(fields[7], "query start", line_no)?,
            query_end: parse_field(fields[8], "query end", line_no)?,
            coverage: parse_field(fields[9], "coverage", line_no)?,
        };

        // The extractor slices by these coordinates, so reject rows the
        // slice math cannot honor.
        let ordered = 1 <= record.query_start
            && record.query_start <= record.query_end
            && record.query_end <= record.query_length;
        if !ordered {
            return Err(BuildError::InvalidHitCoordinates {
                line: line_no,
                start: record.query_start,
                end: record.query_end,
                length: record.query_length,
            });
        }

        Ok(record)
    }
}

fn parse_field<T: FromStr>(
    value: &str,
    field: &'static str,
    line_no: usize,
) -> Result<T, BuildError> {
    value.parse().map_err(|_| BuildError::InvalidHitField {
        line: line_no,
        field,
        value: value.to_string(),
    })
}

/// Parses a whole annotation table. The first malformed line fails the whole
/// table; blank lines are skipped.
pub fn parse_hit_table(text: &str) -> Result<Vec<HitRecord>, BuildError> {
    let mut hits = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        if line.is_empty() {
            continue;
        }
        hits.push(HitRecord::parse_line(line, idx + 1)?);
    }
    Ok(hits)
}

/// Collapses the table to one hit per gene unless `keep_multiple` is set.
///
/// Stable-sorts by coverage ascending, then keeps the last occurrence per
/// `query_id`: each gene retains its maximum-coverage hit (ties resolved in
/// favor of the later input row) and the surviving rows stay in
/// coverage-ascending order. Output ids are derived from positions in this
/// working order, so it must not change between runs.
pub fn dedup_by_coverage(mut hits: Vec<HitRecord>, keep_multiple: bool) -> Vec<HitRecord> {
    if keep_multiple {
        return hits;
    }

    hits.sort_by(|a, b| a.coverage.total_cmp(&b.coverage));

    let mut last_seen: HashMap<String, usize> = HashMap::new();
    for (idx, hit) in hits.iter().enumerate() {
        last_seen.insert(hit.query_id.clone(), idx);
    }

    hits.into_iter()
        .enumerate()
        .filter(|(idx, hit)| last_seen.get(hit.query_id.as_str()) == Some(idx))
        .map(|(_, hit)| hit)
        .collect()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const SAMPLE_LINE: &str = "GH5.hmm\t300\tgeneA\t100\t1e-20\t1\t100\t10\t50\t0.8";

    fn hit(query_id: &str, family: &str, coverage: f64) -> HitRecord {
        HitRecord {
            family: family.to_string(),
            hmm_length: 300,
            query_id: query_id.to_string(),
            query_length: 100,
            e_value: 1e-20,
            hmm_start: 1,
            hmm_end: 100,
            query_start: 1,
            query_end: 100,
            coverage,
        }
    }

    #[test]
    fn parse_line_valid() {
        let record = HitRecord::parse_line(SAMPLE_LINE, 1).unwrap();
        assert_eq!(record.family, "GH5.hmm");
        assert_eq!(record.family_name(), "GH5");
        assert_eq!(record.hmm_length, 300);
        assert_eq!(record.query_id, "geneA");
        assert_eq!(record.query_length, 100);
        assert_eq!(record.query_start, 10);
        assert_eq!(record.query_end, 50);
        assert_eq!(record.coverage, 0.8);
    }

    #[test]
    fn parse_line_wrong_field_count() {
        let short = "GH5.hmm\t300\tgeneA";
        let err = HitRecord::parse_line(short, 3).unwrap_err();
        assert_matches!(err, BuildError::MalformedHitLine { line: 3, found: 3 });

        let long = format!("{SAMPLE_LINE}\textra");
        let err = HitRecord::parse_line(&long, 1).unwrap_err();
        assert_matches!(err, BuildError::MalformedHitLine { found: 11, .. });
    }

    #[test]
    fn parse_line_bad_numeric_field() {
        let line = "GH5.hmm\tlong\tgeneA\t100\t1e-20\t1\t100\t10\t50\t0.8";
        let err = HitRecord::parse_line(line, 1).unwrap_err();
        assert_matches!(
            err,
            BuildError::InvalidHitField {
                field: "model length",
                ..
            }
        );
    }

    #[test]
    fn parse_line_rejects_bad_span() {
        // end beyond query length
        let line = "GH5.hmm\t300\tgeneA\t100\t1e-20\t1\t100\t10\t200\t0.8";
        let err = HitRecord::parse_line(line, 1).unwrap_err();
        assert_matches!(err, BuildError::InvalidHitCoordinates { end: 200, .. });

        // 1-based coordinates, so zero start is out of range
        let line = "GH5.hmm\t300\tgeneA\t100\t1e-20\t1\t100\t0\t50\t0.8";
        let err = HitRecord::parse_line(line, 1).unwrap_err();
        assert_matches!(err, BuildError::InvalidHitCoordinates { start: 0, .. });

        let line = "GH5.hmm\t300\tgeneA\t100\t1e-20\t1\t100\t50\t10\t0.8";
        let err = HitRecord::parse_line(line, 1).unwrap_err();
        assert_matches!(err, BuildError::InvalidHitCoordinates { .. });
    }

    #[test]
    fn parse_table_reports_line_numbers() {
        let text = format!("{SAMPLE_LINE}\nnot\ta\tvalid\tline\n");
        let err = parse_hit_table(&text).unwrap_err();
        assert_matches!(err, BuildError::MalformedHitLine { line: 2, found: 4 });
    }

    #[test]
    fn parse_table_skips_blank_lines() {
        let text = format!("{SAMPLE_LINE}\n\n{SAMPLE_LINE}\n");
        let hits = parse_hit_table(&text).unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn dedup_keeps_max_coverage_per_gene() {
        let hits = vec![
            hit("geneA", "GH5.hmm", 0.5),
            hit("geneB", "PL1.hmm", 0.7),
            hit("geneA", "GH13.hmm", 0.9),
        ];
        let kept = dedup_by_coverage(hits, false);
        assert_eq!(kept.len(), 2);
        // coverage-ascending working order
        assert_eq!(kept[0].query_id, "geneB");
        assert_eq!(kept[1].query_id, "geneA");
        assert_eq!(kept[1].coverage, 0.9);
    }

    #[test]
    fn dedup_tie_keeps_later_row() {
        let hits = vec![hit("geneA", "GH5.hmm", 0.8), hit("geneA", "GH13.hmm", 0.8)];
        let kept = dedup_by_coverage(hits, false);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].family, "GH13.hmm");
    }

    #[test]
    fn dedup_passthrough_when_keeping_multiple() {
        let hits = vec![
            hit("geneA", "GH5.hmm", 0.5),
            hit("geneA", "GH13.hmm", 0.9),
        ];
        let kept = dedup_by_coverage(hits.clone(), true);
        assert_eq!(kept, hits);
    }
}
