use crate::error::BuildError;
use crate::hits::HitRecord;

/// True when the final triplet of the sequence is a stop codon.
pub fn has_stop_codon(sequence: &str) -> bool {
    let bytes = sequence.as_bytes();
    bytes.ends_with(b"TAG") || bytes.ends_with(b"TAA") || bytes.ends_with(b"TGA")
}

/// Expected nucleotide length for a gene: three per amino acid, plus three
/// more when the transcript keeps its trailing stop codon.
pub fn expected_length(query_length: u32, sequence: &str) -> usize {
    let coding = query_length as usize * 3;
    if has_stop_codon(sequence) {
        coding + 3
    } else {
        coding
    }
}

/// Validates the sequence length against the hit's amino-acid length and
/// extracts the codon-aligned subsequence for the annotated span.
///
/// The 1-based inclusive amino-acid coordinates map to the half-open byte
/// range `[(query_start-1)*3, query_end*3)`, so the result is always exactly
/// `(query_end - query_start + 1) * 3` nucleotides and never includes the
/// stop codon. A length mismatch is non-fatal for the pair; the caller skips
/// the hit.
pub fn extract_coding_region(hit: &HitRecord, sequence: &str) -> Result<String, BuildError> {
    let actual = sequence.len();
    let expected = expected_length(hit.query_length, sequence);
    if actual != expected {
        return Err(BuildError::LengthMismatch {
            family: hit.family_name().to_string(),
            query_id: hit.query_id.clone(),
            actual,
            expected,
        });
    }

    // In bounds for any record that passed table parsing: query_end is
    // capped by query_length and the length check above.
    let start = (hit.query_start as usize - 1) * 3;
    let end = hit.query_end as usize * 3;
    Ok(String::from_utf8_lossy(&sequence.as_bytes()[start..end]).into_owned())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn hit(query_length: u32, query_start: u32, query_end: u32) -> HitRecord {
        HitRecord {
            family: "GH5.hmm".to_string(),
            hmm_length: 300,
            query_id: "geneA".to_string(),
            query_length,
            e_value: 1e-20,
            hmm_start: 1,
            hmm_end: 100,
            query_start,
            query_end,
            coverage: 0.8,
        }
    }

    #[test]
    fn detects_stop_codons() {
        assert!(has_stop_codon("ATGTAA"));
        assert!(has_stop_codon("ATGTAG"));
        assert!(has_stop_codon("ATGTGA"));
        assert!(!has_stop_codon("ATGGGG"));
        assert!(!has_stop_codon("AA"));
    }

    #[test]
    fn expected_length_accounts_for_stop_codon() {
        assert_eq!(expected_length(2, "ATGAAATAA"), 9);
        assert_eq!(expected_length(2, "ATGAAA"), 6);
    }

    #[test]
    fn accepts_both_valid_lengths() {
        // 2 codons plus stop
        let with_stop = hit(2, 1, 2);
        assert_eq!(
            extract_coding_region(&with_stop, "ATGAAATAA").unwrap(),
            "ATGAAA"
        );

        // 2 codons, no stop retained
        let without_stop = hit(2, 1, 2);
        assert_eq!(
            extract_coding_region(&without_stop, "ATGAAA").unwrap(),
            "ATGAAA"
        );
    }

    #[test]
    fn length_mismatch_carries_both_lengths() {
        let record = hit(100, 10, 50);
        let sequence = "A".repeat(299);
        let err = extract_coding_region(&record, &sequence).unwrap_err();
        assert_matches!(
            err,
            BuildError::LengthMismatch {
                actual: 299,
                expected: 300,
                ..
            }
        );

        // one nucleotide short of query_length*3 + 3
        let sequence = format!("{}TAA", "A".repeat(299));
        let err = extract_coding_region(&record, &sequence).unwrap_err();
        assert_matches!(
            err,
            BuildError::LengthMismatch {
                actual: 302,
                expected: 303,
                ..
            }
        );
    }

    #[test]
    fn extracts_annotated_span() {
        // 100 amino acids, stop codon retained: offsets [27, 150)
        let record = hit(100, 10, 50);
        let sequence = format!("{}TAA", "ACG".repeat(100));
        let region = extract_coding_region(&record, &sequence).unwrap();
        assert_eq!(region.len(), 123);
        assert_eq!(region, "ACG".repeat(41));
    }

    #[test]
    fn full_span_excludes_stop_codon() {
        let record = hit(100, 1, 100);
        let sequence = format!("{}TAA", "ACG".repeat(100));
        let region = extract_coding_region(&record, &sequence).unwrap();
        assert_eq!(region, "ACG".repeat(100));
    }

    #[test]
    fn extracted_length_matches_span() {
        for (start, end) in [(1, 1), (3, 7), (1, 100), (100, 100)] {
            let record = hit(100, start, end);
            let sequence = "ACG".repeat(100);
            let region = extract_coding_region(&record, &sequence).unwrap();
            assert_eq!(region.len(), (end - start + 1) as usize * 3);
        }
    }
}
