//! CSV loading.
//!
//! The first column holds the row id, every other column a numeric feature.

use crate::error::{CliError, Result};
use divclust::data::ObservationTable;
use divclust::primitives::Matrix;
use std::path::Path;

/// Fails with exit code 3 when the path is missing or not a regular file.
pub(crate) fn validate_path(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(CliError::FileNotFound(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(CliError::NotAFile(path.to_path_buf()));
    }
    Ok(())
}

/// Reads an observation table from a headed CSV file.
pub(crate) fn load_table(path: &Path) -> Result<ObservationTable> {
    validate_path(path)?;

    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    if headers.len() < 2 {
        return Err(CliError::InvalidInput(format!(
            "{} needs an id column and at least one feature column",
            path.display()
        )));
    }
    let feature_names: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();
    let n_features = feature_names.len();

    let mut ids = Vec::new();
    let mut values = Vec::new();
    // header is line 1
    for (line, record) in (2..).zip(reader.records()) {
        let record = record?;
        let mut fields = record.iter();
        let id = fields
            .next()
            .ok_or_else(|| CliError::InvalidInput(format!("line {line}: missing id")))?;
        ids.push(id.trim().to_string());

        for (name, raw) in feature_names.iter().zip(fields) {
            let value = raw.trim().parse::<f64>().map_err(|_| {
                CliError::InvalidInput(format!("line {line}, column '{name}': '{raw}' is not a number"))
            })?;
            values.push(value);
        }
    }

    let n_rows = ids.len();
    if n_rows == 0 {
        return Err(CliError::InvalidInput(format!("{} has no rows", path.display())));
    }
    let features = Matrix::from_vec(n_rows, n_features, values)
        .map_err(|e| CliError::InvalidInput(e.to_string()))?;
    tracing::debug!(rows = n_rows, features = n_features, "loaded {}", path.display());

    Ok(ObservationTable::new(ids, feature_names, features)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        write!(file, "{contents}").expect("write csv");
        file
    }

    #[test]
    fn test_load_table() {
        let file = csv_file("name,x,y\na,1.0,2.0\nb,3.5,-1\n");
        let table = load_table(file.path()).expect("load csv");

        assert_eq!(table.shape(), (2, 2));
        assert_eq!(table.ids(), ["a", "b"]);
        assert_eq!(table.feature_names(), ["x", "y"]);
        assert_eq!(table.features().get(1, 0), 3.5);
    }

    #[test]
    fn test_non_numeric_feature_rejected() {
        let file = csv_file("name,x\na,1.0\nb,oops\n");
        let err = load_table(file.path()).unwrap_err();
        assert!(matches!(err, CliError::InvalidInput(ref m) if m.contains("line 3")));
    }

    #[test]
    fn test_ragged_row_rejected() {
        let file = csv_file("name,x,y\na,1.0,2.0\nb,3.0\n");
        assert!(matches!(load_table(file.path()), Err(CliError::InvalidInput(_))));
    }

    #[test]
    fn test_id_only_and_empty_files_rejected() {
        let ids_only = csv_file("name\na\nb\n");
        assert!(matches!(load_table(ids_only.path()), Err(CliError::InvalidInput(_))));

        let header_only = csv_file("name,x\n");
        assert!(matches!(load_table(header_only.path()), Err(CliError::InvalidInput(_))));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let file = csv_file("name,x\na,1\na,2\n");
        assert!(matches!(load_table(file.path()), Err(CliError::InvalidInput(_))));
    }

    #[test]
    fn test_missing_file() {
        let err = load_table(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, CliError::FileNotFound(_)));
    }
}
