//! CSV loading
//!
//! Reads a header-first CSV into a [`ResponseTable`]. Cells and headers are
//! whitespace-trimmed; columns named in `ignored_columns` (stray index
//! columns written by spreadsheet exports) are discarded.

use crate::data::ResponseTable;
use crate::error::{Error, Result};
use csv::{ReaderBuilder, Trim};
use fgb_common::AnalysisConfig;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Load a CSV file from disk
pub fn load_csv(path: &Path, name: &str, config: &AnalysisConfig) -> Result<ResponseTable> {
    if !path.is_file() {
        return Err(Error::MissingInputFile {
            path: path.to_path_buf(),
            reason: "file does not exist".to_string(),
        });
    }

    let file = File::open(path).map_err(|e| Error::MissingInputFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let table = read_csv(file, name, config)?;
    debug!(
        path = %path.display(),
        table = name,
        rows = table.len(),
        columns = table.headers().len(),
        "Loaded CSV"
    );
    Ok(table)
}

/// Parse CSV content from any reader
pub fn read_csv<R: Read>(reader: R, name: &str, config: &AnalysisConfig) -> Result<ResponseTable> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader.headers()?.iter().map(|h| h.to_string()).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(Error::SchemaMismatch(format!("{} table has no header row", name)));
    }

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        // Blank trailing lines come through as a single empty field
        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        rows.push(record.iter().map(|cell| cell.to_string()).collect());
    }

    let table = ResponseTable::new(name, headers, rows)?;
    Ok(table.without_columns(|h| config.is_ignored_column(h)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_and_trims() {
        let data = "Participant , Group,Stimulus 1\n P1 ,A, 1\nP2,B,0\n";
        let table = read_csv(data.as_bytes(), "primary", &AnalysisConfig::default()).unwrap();

        assert_eq!(table.headers(), &["Participant", "Group", "Stimulus 1"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0], vec!["P1", "A", "1"]);
    }

    #[test]
    fn test_drops_index_columns() {
        let data = ",Participant,Stimulus 1\n0,P1,Left\n1,P2,Right\n";
        let table = read_csv(data.as_bytes(), "side-choice", &AnalysisConfig::default()).unwrap();
        assert_eq!(table.headers(), &["Participant", "Stimulus 1"]);

        let data = "Unnamed: 0,Participant\n0,P1\n";
        let table = read_csv(data.as_bytes(), "side-choice", &AnalysisConfig::default()).unwrap();
        assert_eq!(table.headers(), &["Participant"]);
    }

    #[test]
    fn test_ragged_csv_is_error() {
        let data = "Participant,Group\nP1,A,extra\n";
        let result = read_csv(data.as_bytes(), "primary", &AnalysisConfig::default());
        assert!(matches!(result, Err(Error::Csv(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = load_csv(
            Path::new("/nonexistent/fgb/Result_test.csv"),
            "primary",
            &AnalysisConfig::default(),
        );
        assert!(matches!(result, Err(Error::MissingInputFile { .. })));
    }
}
