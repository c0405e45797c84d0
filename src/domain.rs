use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::BuildError;

/// Family ids are matched anywhere in the model name, so `GH5` is found in
/// both `GH5` and `GH5.hmm`.
static FAMILY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(GH|GT|CBM|PL|AA|CE)(\d+)(_\d+)?").unwrap());

/// The six CAZy enzyme classes that appear as family-name prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FamilyCategory {
    Gh,
    Gt,
    Cbm,
    Pl,
    Aa,
    Ce,
}

impl FamilyCategory {
    fn from_code(code: &str) -> Option<Self> {
        match code {
            "GH" => Some(FamilyCategory::Gh),
            "GT" => Some(FamilyCategory::Gt),
            "CBM" => Some(FamilyCategory::Cbm),
            "PL" => Some(FamilyCategory::Pl),
            "AA" => Some(FamilyCategory::Aa),
            "CE" => Some(FamilyCategory::Ce),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FamilyCategory::Gh => "GH",
            FamilyCategory::Gt => "GT",
            FamilyCategory::Cbm => "CBM",
            FamilyCategory::Pl => "PL",
            FamilyCategory::Aa => "AA",
            FamilyCategory::Ce => "CE",
        }
    }
}

impl fmt::Display for FamilyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A family model name reduced to its class code, family number and optional
/// subfamily number, e.g. `GH5` or `GH5_2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyCode {
    pub category: FamilyCategory,
    pub number: u32,
    pub subfamily: Option<u32>,
}

impl fmt::Display for FamilyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.category, self.number)?;
        if let Some(sub) = self.subfamily {
            write!(f, "_{sub}")?;
        }
        Ok(())
    }
}

impl FromStr for FamilyCode {
    type Err = BuildError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let unrecognized = || BuildError::UnrecognizedFamily(value.to_string());
        let captures = FAMILY_PATTERN.captures(value).ok_or_else(unrecognized)?;
        let category = FamilyCategory::from_code(&captures[1]).ok_or_else(unrecognized)?;
        let number = captures[2].parse().map_err(|_| unrecognized())?;
        let subfamily = match captures.get(3) {
            Some(tail) => Some(
                tail.as_str()[1..]
                    .parse()
                    .map_err(|_| unrecognized())?,
            ),
            None => None,
        };
        Ok(Self {
            category,
            number,
            subfamily,
        })
    }
}

/// Output identifier shared by the sequence and taxonomy files: sample
/// basename, the hit's 0-based position in the working table, and the gene
/// id, e.g. `sample1_cazy_0000_geneA`.
pub fn record_id(basename: &str, index: usize, query_id: &str) -> String {
    format!("{basename}_cazy_{index:04}_{query_id}")
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parse_family_code_plain() {
        let code: FamilyCode = "GH5".parse().unwrap();
        assert_eq!(code.category, FamilyCategory::Gh);
        assert_eq!(code.number, 5);
        assert_eq!(code.subfamily, None);
    }

    #[test]
    fn parse_family_code_with_subfamily() {
        let code: FamilyCode = "GH13_24".parse().unwrap();
        assert_eq!(code.category, FamilyCategory::Gh);
        assert_eq!(code.number, 13);
        assert_eq!(code.subfamily, Some(24));
    }

    #[test]
    fn parse_family_code_searches_within_id() {
        let code: FamilyCode = "GH5.hmm".parse().unwrap();
        assert_eq!(code.to_string(), "GH5");

        let embedded: FamilyCode = "cluster_CBM50_x".parse().unwrap();
        assert_eq!(embedded.category, FamilyCategory::Cbm);
        assert_eq!(embedded.number, 50);
    }

    #[test]
    fn parse_family_code_rejects_unknown() {
        let err = "dockerin".parse::<FamilyCode>().unwrap_err();
        assert_matches!(err, BuildError::UnrecognizedFamily(_));

        let err = "gh5".parse::<FamilyCode>().unwrap_err();
        assert_matches!(err, BuildError::UnrecognizedFamily(_));
    }

    #[test]
    fn family_code_display_round_trip() {
        let code: FamilyCode = "PL9_1".parse().unwrap();
        assert_eq!(code.to_string(), "PL9_1");
    }

    #[test]
    fn record_id_zero_pads_index() {
        assert_eq!(record_id("sample1", 0, "geneA"), "sample1_cazy_0000_geneA");
        assert_eq!(record_id("s", 12, "g"), "s_cazy_0012_g");
        assert_eq!(record_id("s", 10000, "g"), "s_cazy_10000_g");
    }
}
