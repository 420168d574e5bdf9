use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Column labels recognized as the student name column.
pub const NAME_CANDIDATES: [&str; 4] = ["Name", "Student Name", "NAME", "Names"];

/// Summary columns that are never treated as subjects.
pub const SUMMARY_COLUMNS: [&str; 6] = ["Reg. No", "TOTAL", "AVG.", "MAX", "MIN", "GRADE"];

/// Columns that must be present in every input file.
pub const REQUIRED_COLUMNS: [&str; 2] = ["TOTAL", "GRADE"];

#[derive(Error, Debug)]
pub enum TableError {
    #[error("Spreadsheet file not found at: {0}")]
    FileNotFound(String),

    #[error("No student name column found. Detected: {0:?}")]
    MissingNameColumn(Vec<String>),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("No subject columns detected.")]
    NoSubjectColumns,

    #[error("Spreadsheet is empty")]
    EmptyTable,

    #[error("No sheets found in Excel file")]
    NoSheets,

    #[error("Unsupported file extension: {0}")]
    UnsupportedExtension(String),

    #[error("File has no extension")]
    MissingExtension,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Excel error: {0}")]
    Excel(#[from] calamine::XlsxError),
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Empty,
}

impl CellValue {
    /// Numeric view of the cell. Text that parses as a number counts.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => s.trim().parse().ok(),
            CellValue::Empty => None,
        }
    }

    /// Display form used for identity fields (names, grades).
    pub fn display(&self) -> String {
        match self {
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            CellValue::Text(s) => s.clone(),
            CellValue::Empty => String::new(),
        }
    }
}

/// The wide table: one row per student, one column per subject or summary field.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct GradeTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl GradeTable {
    /// Builds a table from raw headers and rows. Headers are trimmed and every
    /// row is padded or truncated to the header width so indexing by column is
    /// always in bounds.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let headers: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Empty);
                row
            })
            .collect();
        GradeTable { headers, rows }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }
}

/// Column roles detected from a [`GradeTable`]'s headers.
#[derive(Clone, Debug)]
pub struct Schema {
    pub name_col: usize,
    pub total_col: usize,
    pub grade_col: usize,
    pub subject_cols: Vec<usize>,
}

impl Schema {
    /// Detects the name column, the required summary columns, and the subject
    /// columns. Fails with the first missing piece, naming it.
    pub fn detect(table: &GradeTable) -> Result<Self, TableError> {
        if table.headers.is_empty() {
            return Err(TableError::EmptyTable);
        }

        let name_col = NAME_CANDIDATES
            .iter()
            .find_map(|c| table.column_index(c))
            .ok_or_else(|| TableError::MissingNameColumn(table.headers.clone()))?;

        let total_col = table
            .column_index("TOTAL")
            .ok_or_else(|| TableError::MissingColumn("TOTAL".to_string()))?;
        let grade_col = table
            .column_index("GRADE")
            .ok_or_else(|| TableError::MissingColumn("GRADE".to_string()))?;

        // Everything that is neither the name column nor a summary column is a subject.
        let subject_cols: Vec<usize> = table
            .headers
            .iter()
            .enumerate()
            .filter(|(i, h)| *i != name_col && !SUMMARY_COLUMNS.contains(&h.as_str()))
            .map(|(i, _)| i)
            .collect();

        if subject_cols.is_empty() {
            return Err(TableError::NoSubjectColumns);
        }

        Ok(Schema {
            name_col,
            total_col,
            grade_col,
            subject_cols,
        })
    }

    /// Header label of the detected name column.
    pub fn name_header<'a>(&self, table: &'a GradeTable) -> &'a str {
        &table.headers[self.name_col]
    }

    /// Subject labels in column order.
    pub fn subject_names<'a>(&self, table: &'a GradeTable) -> Vec<&'a str> {
        self.subject_cols
            .iter()
            .map(|&i| table.headers[i].as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(s: &str) -> CellValue {
        match s.trim() {
            "" => CellValue::Empty,
            t => t
                .parse::<f64>()
                .map(CellValue::Number)
                .unwrap_or_else(|_| CellValue::Text(t.to_string())),
        }
    }

    fn sample_table() -> GradeTable {
        let headers = ["Name", "Reg. No", "Math", "Science", "TOTAL", "AVG.", "MAX", "MIN", "GRADE"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let rows = vec![
            vec!["Asha", "101", "90", "80", "170", "85", "90", "80", "A"],
            vec!["Ben", "102", "60", "70", "130", "65", "70", "60", "B"],
            vec!["Chandra", "103", "75", "85", "160", "80", "85", "75", "A"],
        ]
        .into_iter()
        .map(|r| r.into_iter().map(cell).collect())
        .collect();
        GradeTable::new(headers, rows)
    }

    #[test]
    fn detects_subjects_from_sample() {
        let table = sample_table();
        let schema = Schema::detect(&table).unwrap();
        assert_eq!(schema.name_header(&table), "Name");
        assert_eq!(schema.subject_names(&table), vec!["Math", "Science"]);
        assert_eq!(table.headers[schema.total_col], "TOTAL");
        assert_eq!(table.headers[schema.grade_col], "GRADE");
    }

    #[test]
    fn accepts_every_name_candidate() {
        for candidate in NAME_CANDIDATES {
            let table = GradeTable::new(
                vec![
                    candidate.to_string(),
                    "Math".to_string(),
                    "TOTAL".to_string(),
                    "GRADE".to_string(),
                ],
                vec![vec![
                    CellValue::Text("Asha".to_string()),
                    CellValue::Number(90.0),
                    CellValue::Number(90.0),
                    CellValue::Text("A".to_string()),
                ]],
            );
            let schema = Schema::detect(&table).unwrap();
            assert_eq!(schema.name_header(&table), candidate);
        }
    }

    #[test]
    fn missing_name_column_lists_headers() {
        let table = GradeTable::new(
            vec!["Roll".to_string(), "TOTAL".to_string(), "GRADE".to_string()],
            vec![],
        );
        match Schema::detect(&table) {
            Err(TableError::MissingNameColumn(headers)) => {
                assert_eq!(headers, vec!["Roll", "TOTAL", "GRADE"]);
            }
            other => panic!("expected MissingNameColumn, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn missing_required_column_is_named() {
        for dropped in REQUIRED_COLUMNS {
            let headers: Vec<String> = ["Name", "Math", "TOTAL", "GRADE"]
                .iter()
                .filter(|h| **h != dropped)
                .map(|s| s.to_string())
                .collect();
            let table = GradeTable::new(headers, vec![]);
            match Schema::detect(&table) {
                Err(TableError::MissingColumn(name)) => assert_eq!(name, dropped),
                other => panic!("expected MissingColumn, got {:?}", other.map(|_| ())),
            }
        }
    }

    #[test]
    fn zero_subject_columns_is_an_error() {
        let table = GradeTable::new(
            vec![
                "Name".to_string(),
                "Reg. No".to_string(),
                "TOTAL".to_string(),
                "AVG.".to_string(),
                "MAX".to_string(),
                "MIN".to_string(),
                "GRADE".to_string(),
            ],
            vec![],
        );
        assert!(matches!(
            Schema::detect(&table),
            Err(TableError::NoSubjectColumns)
        ));
    }

    #[test]
    fn headers_are_trimmed_and_rows_padded() {
        let table = GradeTable::new(
            vec!["  Name ".to_string(), "Math ".to_string()],
            vec![vec![CellValue::Text("Asha".to_string())]],
        );
        assert_eq!(table.headers, vec!["Name", "Math"]);
        assert_eq!(table.rows[0].len(), 2);
        assert_eq!(table.rows[0][1], CellValue::Empty);
    }

    #[test]
    fn cell_value_numeric_views() {
        assert_eq!(CellValue::Number(85.5).as_number(), Some(85.5));
        assert_eq!(CellValue::Text(" 90 ".to_string()).as_number(), Some(90.0));
        assert_eq!(CellValue::Text("absent".to_string()).as_number(), None);
        assert_eq!(CellValue::Empty.as_number(), None);
        assert_eq!(CellValue::Number(170.0).display(), "170");
        assert_eq!(CellValue::Number(85.5).display(), "85.5");
    }
}
