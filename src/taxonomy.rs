use crate::domain::FamilyCode;
use crate::error::BuildError;

/// Taxonomy assigned when a family id cannot be resolved. Fixed at four
/// levels for output compatibility, whatever the loaded table's width.
pub const FALLBACK_TAXONOMY: &str = "L1_Others;Others;Others;Others";

/// The external CAZy level table: named hierarchy columns plus one column
/// holding the short classification code that family categories join
/// against.
#[derive(Debug, Clone)]
pub struct LevelTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
    code_column: usize,
}

impl LevelTable {
    /// Parses tab-delimited text with a header row naming the columns.
    /// `code_column` selects the classification-code column by name. Rows
    /// shorter than the header are padded with empty cells; longer rows
    /// fail.
    pub fn parse(text: &str, code_column: &str) -> Result<Self, BuildError> {
        let mut lines = text.lines();
        let header = lines.next().ok_or(BuildError::EmptyLevelTable)?;
        let columns: Vec<String> = header
            .split('\t')
            .map(|cell| cell.trim().to_string())
            .collect();
        let code_idx = columns
            .iter()
            .position(|name| name == code_column)
            .ok_or_else(|| BuildError::MissingCodeColumn(code_column.to_string()))?;

        let mut rows = Vec::new();
        for (idx, line) in lines.enumerate() {
            if line.is_empty() {
                continue;
            }
            let mut cells: Vec<String> = line
                .split('\t')
                .map(|cell| cell.trim().to_string())
                .collect();
            if cells.len() > columns.len() {
                return Err(BuildError::MalformedLevelRow {
                    line: idx + 2,
                    found: cells.len(),
                    columns: columns.len(),
                });
            }
            cells.resize(columns.len(), String::new());
            rows.push(cells);
        }

        Ok(Self {
            columns,
            rows,
            code_column: code_idx,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Resolves a family id (model suffix already stripped) into its
    /// taxonomy string: `columnName_cellValue` pairs from the first row
    /// whose code cell equals the family's category, joined by `;`, with
    /// the family number appended to the tail.
    ///
    /// Callers map the error to [`FALLBACK_TAXONOMY`]; resolution itself
    /// never writes output.
    pub fn resolve(&self, family_id: &str) -> Result<String, BuildError> {
        let code: FamilyCode = family_id.parse()?;
        let row = self
            .rows
            .iter()
            .find(|row| row[self.code_column] == code.category.as_str())
            .ok_or_else(|| BuildError::UnrecognizedFamily(family_id.to_string()))?;

        let mut taxonomy = self
            .columns
            .iter()
            .zip(row)
            .map(|(name, cell)| format!("{name}_{cell}"))
            .collect::<Vec<_>>()
            .join(";");
        taxonomy.push_str(&code.number.to_string());
        Ok(taxonomy)
    }
}
