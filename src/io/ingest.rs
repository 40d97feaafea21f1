//! CSV ingest.
//!
//! Turns a measurement CSV into a [`Dataset`]:
//! - a header row is required
//! - every column but the last is a numeric feature dimension
//! - the last column is the numeric target
//!
//! Any bad cell is fatal (exit code 2); the error names the line and column.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use log::info;

use crate::domain::Dataset;
use crate::error::AppError;

/// Load a dataset from a CSV file.
pub fn load_dataset(path: &Path) -> Result<Dataset, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::invalid_input(format!("Failed to open CSV '{}': {e}", path.display())))?;
    let dataset = read_dataset(file)?;
    info!(
        "loaded {} rows x {} dimensions from '{}'",
        dataset.num_rows(),
        dataset.num_dimensions(),
        path.display()
    );
    Ok(dataset)
}

/// Parse a dataset from any CSV reader.
pub fn read_dataset<R: Read>(input: R) -> Result<Dataset, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::invalid_input(format!("Failed to read CSV headers: {e}")))?
        .clone();

    let mut names: Vec<String> = headers.iter().map(normalize_header_name).collect();
    if names.len() < 2 {
        return Err(AppError::invalid_input(format!(
            "CSV needs at least one feature column and a target column; found {} column(s).",
            names.len()
        )));
    }
    let target_name = names.pop().unwrap_or_default();
    let num_dimensions = names.len();

    let mut columns = vec![Vec::new(); num_dimensions];
    let mut targets = Vec::new();

    for result in reader.records() {
        let record = result.map_err(|e| AppError::invalid_input(format!("CSV parse error: {e}")))?;
        let line = record_line(&record);
        if record.len() != num_dimensions + 1 {
            return Err(AppError::invalid_input(format!(
                "Line {line}: expected {} fields, found {}.",
                num_dimensions + 1,
                record.len()
            )));
        }
        for (col, cell) in record.iter().enumerate() {
            let name = names.get(col).map(String::as_str).unwrap_or(&target_name);
            let value = parse_cell(cell)
                .map_err(|e| AppError::invalid_input(format!("Line {line}, column '{name}': {e}")))?;
            match columns.get_mut(col) {
                Some(c) => c.push(value),
                None => targets.push(value),
            }
        }
    }

    Dataset::from_columns(names, target_name, columns, targets)
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports may prefix the first header with a UTF-8 BOM.
    name.trim_start_matches('\u{feff}').trim().to_string()
}

fn record_line(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}

fn parse_cell(cell: &str) -> Result<f64, String> {
    if cell.is_empty() {
        return Err("empty value".to_string());
    }
    let v: f64 = cell.parse().map_err(|_| format!("'{cell}' is not a number"))?;
    if !v.is_finite() {
        return Err(format!("'{cell}' is not finite"));
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_column_is_target() {
        let csv = "n,w,time\n1,10,0.5\n2,20,1.5\n3,30,2.5\n";
        let d = read_dataset(csv.as_bytes()).unwrap();
        assert_eq!(d.num_dimensions(), 2);
        assert_eq!(d.num_rows(), 3);
        assert_eq!(d.feature_names(), ["n".to_string(), "w".to_string()]);
        assert_eq!(d.target_name(), "time");
        assert_eq!(d.columns()[1], vec![10.0, 20.0, 30.0]);
        assert_eq!(d.targets(), [0.5, 1.5, 2.5]);
    }

    #[test]
    fn strips_bom_and_whitespace() {
        let csv = "\u{feff} n , t\n 4 , 1e3 \n";
        let d = read_dataset(csv.as_bytes()).unwrap();
        assert_eq!(d.feature_names(), ["n".to_string()]);
        assert_eq!(d.target_name(), "t");
        assert_eq!(d.targets(), [1000.0]);
    }

    #[test]
    fn bad_cell_reports_line_and_column() {
        let csv = "n,t\n1,2\n3,abc\n";
        let err = read_dataset(csv.as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("Line 3"), "{}", err.message());
        assert!(err.message().contains("'t'"), "{}", err.message());
    }

    #[test]
    fn rejects_non_finite_and_empty_cells() {
        assert!(read_dataset("n,t\ninf,1\n".as_bytes()).is_err());
        assert!(read_dataset("n,t\nNaN,1\n".as_bytes()).is_err());
        assert!(read_dataset("n,t\n,1\n".as_bytes()).is_err());
    }

    #[test]
    fn rejects_single_column_and_no_rows() {
        assert!(read_dataset("t\n1\n".as_bytes()).is_err());
        assert!(read_dataset("n,t\n".as_bytes()).is_err());
    }

    #[test]
    fn ragged_row_is_fatal() {
        let err = read_dataset("n,w,t\n1,2,3\n4,5\n".as_bytes()).unwrap_err();
        assert!(err.message().contains("Line 3") || err.message().contains("CSV parse error"));
    }

    #[test]
    fn load_from_file() {
        let path = std::env::temp_dir().join(format!("cxs-ingest-{}.csv", std::process::id()));
        std::fs::write(&path, "V,E,t\n10,20,30\n20,40,60\n").unwrap();
        let d = load_dataset(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(d.num_rows(), 2);

        let missing = load_dataset(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert_eq!(missing.exit_code(), 2);
    }
}
