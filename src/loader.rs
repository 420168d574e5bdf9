use std::path::Path;

use calamine::{open_workbook, Data, Reader, Xlsx};

use crate::table::{CellValue, GradeTable, TableError};

/// Load a grade table from a CSV file
///
/// The first record is treated as the header row. Header labels are trimmed,
/// numeric-looking fields become numbers, and blank fields stay empty so the
/// chart layer can render them as gaps.
///
/// # Arguments
/// * `filepath` - Path to the CSV file to load
///
/// # Returns
/// * `Result<GradeTable, TableError>` - The loaded wide table or an error
///
/// # Examples
/// ```no_run
/// use gradedash::loader::from_csv;
///
/// match from_csv("students.csv") {
///     Ok(table) => println!("Loaded {} students", table.n_rows()),
///     Err(e) => eprintln!("Error loading CSV: {}", e),
/// }
/// ```
pub fn from_csv(filepath: impl AsRef<Path>) -> Result<GradeTable, TableError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(filepath)?;

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(TableError::EmptyTable);
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(parse_field).collect());
    }

    Ok(GradeTable::new(headers, rows))
}

/// Load a grade table from an Excel file
///
/// Reads the first worksheet of an XLSX workbook. The first row is the header
/// row; the remaining rows become student records.
///
/// # Arguments
/// * `filepath` - Path to the Excel file to load
///
/// # Returns
/// * `Result<GradeTable, TableError>` - The loaded wide table or an error
///
/// # Examples
/// ```no_run
/// use gradedash::loader::from_excel;
///
/// match from_excel("Student.xlsx") {
///     Ok(table) => println!("Loaded {} students", table.n_rows()),
///     Err(e) => eprintln!("Error loading Excel: {}", e),
/// }
/// ```
pub fn from_excel(filepath: impl AsRef<Path>) -> Result<GradeTable, TableError> {
    let mut workbook: Xlsx<_> = open_workbook(filepath)?;

    // Use the first worksheet
    let sheet_name = workbook
        .sheet_names()
        .first()
        .ok_or(TableError::NoSheets)?
        .clone();

    let range = workbook.worksheet_range(&sheet_name)?;
    if range.height() == 0 || range.width() == 0 {
        return Err(TableError::EmptyTable);
    }

    let mut row_iter = range.rows();
    let headers: Vec<String> = row_iter
        .next()
        .ok_or(TableError::EmptyTable)?
        .iter()
        .map(header_from_data)
        .collect();

    let rows: Vec<Vec<CellValue>> = row_iter
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect();

    Ok(GradeTable::new(headers, rows))
}

fn parse_field(field: &str) -> CellValue {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return CellValue::Empty;
    }
    match trimmed.parse::<f64>() {
        Ok(n) => CellValue::Number(n),
        Err(_) => CellValue::Text(trimmed.to_string()),
    }
}

fn header_from_data(data: &Data) -> String {
    match data {
        Data::String(s) => s.trim().to_string(),
        Data::Empty => String::new(),
        other => other.to_string().trim().to_string(),
    }
}

fn cell_from_data(data: &Data) -> CellValue {
    match data {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => parse_field(s),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) | Data::Empty => CellValue::Empty,
    }
}

/// Detect file type and load appropriate format
///
/// Checks that the file exists, then dispatches on the extension to the CSV
/// or Excel loader.
///
/// # Arguments
/// * `filepath` - Path to the file to load
///
/// # Returns
/// * `Result<GradeTable, TableError>` - The loaded wide table or an error
///
/// # Examples
/// ```no_run
/// use gradedash::loader::load_table;
///
/// match load_table("Student.xlsx") {
///     Ok(table) => println!("Successfully loaded {} students", table.n_rows()),
///     Err(e) => eprintln!("Error loading file: {}", e),
/// }
/// ```
pub fn load_table(filepath: impl AsRef<Path>) -> Result<GradeTable, TableError> {
    let path = filepath.as_ref();
    if !path.exists() {
        return Err(TableError::FileNotFound(path.display().to_string()));
    }

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());

    match extension.as_deref() {
        Some("csv") => from_csv(path),
        Some("xlsx") | Some("xls") => from_excel(path),
        Some(ext) => Err(TableError::UnsupportedExtension(ext.to_string())),
        None => Err(TableError::MissingExtension),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Schema;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .expect("temp csv");
        file.write_all(contents.as_bytes()).expect("write csv");
        file
    }

    #[test]
    fn loads_csv_with_trimmed_headers() {
        let file = write_csv(
            " Name ,Reg. No,Math,Science,TOTAL,AVG.,MAX,MIN,GRADE\n\
             Asha,101,90,80,170,85,90,80,A\n\
             Ben,102,60,70,130,65,70,60,B\n\
             Chandra,103,75,85,160,80,85,75,A\n",
        );

        let table = load_table(file.path()).unwrap();
        assert_eq!(table.headers[0], "Name");
        assert_eq!(table.n_rows(), 3);
        assert_eq!(table.rows[0][2], CellValue::Number(90.0));
        assert_eq!(table.rows[1][8], CellValue::Text("B".to_string()));

        let schema = Schema::detect(&table).unwrap();
        assert_eq!(schema.subject_names(&table), vec!["Math", "Science"]);
    }

    #[test]
    fn blank_and_textual_marks_survive_loading() {
        let file = write_csv(
            "Name,Math,TOTAL,GRADE\n\
             Asha,,90,A\n\
             Ben,absent,0,C\n",
        );

        let table = load_table(file.path()).unwrap();
        assert_eq!(table.rows[0][1], CellValue::Empty);
        assert_eq!(table.rows[1][1], CellValue::Text("absent".to_string()));
    }

    #[test]
    fn short_rows_are_padded_to_header_width() {
        let file = write_csv(
            "Name,Math,TOTAL,GRADE\n\
             Asha,90\n",
        );

        let table = load_table(file.path()).unwrap();
        assert_eq!(table.rows[0].len(), 4);
        assert_eq!(table.rows[0][3], CellValue::Empty);
    }

    #[test]
    fn missing_file_is_reported_with_its_path() {
        match load_table("no_such_dir/Student.xlsx") {
            Err(TableError::FileNotFound(path)) => {
                assert!(path.contains("Student.xlsx"));
            }
            other => panic!("expected FileNotFound, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let mut file = tempfile::Builder::new()
            .suffix(".txt")
            .tempfile()
            .expect("temp txt");
        file.write_all(b"Name,TOTAL,GRADE\n").expect("write");

        assert!(matches!(
            load_table(file.path()),
            Err(TableError::UnsupportedExtension(ext)) if ext == "txt"
        ));
    }
}
