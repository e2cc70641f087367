//! The row store: a grid of rows in the fixed `Column` order.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{RowSyncError, RowSyncResult};
use crate::record::{Column, Row};

pub trait RowStore {
    /// Rows of the data section, header excluded.
    fn read_rows(&self) -> RowSyncResult<Vec<Row>>;

    /// Replace the data section. An empty slice clears it.
    fn write_rows(&mut self, rows: &[Row]) -> RowSyncResult<()>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SheetFile {
    #[serde(default)]
    columns: Vec<String>,
    #[serde(default)]
    rows: Vec<Row>,
}

/// A sheet kept as a JSON file: `{"columns": [...], "rows": [[...], ...]}`.
#[derive(Debug, Clone)]
pub struct JsonSheet {
    path: PathBuf,
}

impl JsonSheet {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonSheet { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RowStore for JsonSheet {
    fn read_rows(&self) -> RowSyncResult<Vec<Row>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let sheet: SheetFile = serde_json::from_str(&content).map_err(|e| {
            RowSyncError::Sheet(format!("Could not parse {}: {}", self.path.display(), e))
        })?;

        if !sheet.columns.is_empty() && sheet.columns != Column::header() {
            return Err(RowSyncError::Sheet(format!(
                "Unexpected columns in {}: expected {}",
                self.path.display(),
                Column::header().join(", ")
            )));
        }

        Ok(sheet.rows)
    }

    fn write_rows(&mut self, rows: &[Row]) -> RowSyncResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let sheet = SheetFile {
            columns: Column::header(),
            rows: rows.to_vec(),
        };
        let content = serde_json::to_string_pretty(&sheet)?;
        std::fs::write(&self.path, content)?;

        tracing::debug!(path = %self.path.display(), rows = rows.len(), "wrote sheet");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let sheet = JsonSheet::new(dir.path().join("none.json"));
        assert!(sheet.read_rows().unwrap().is_empty());
    }

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let mut sheet = JsonSheet::new(dir.path().join("a").join("sheet.json"));
        let rows = vec![vec!["id1".to_string(), "Lunch".to_string()]];

        sheet.write_rows(&rows).unwrap();

        assert_eq!(sheet.read_rows().unwrap(), rows);
        let raw = std::fs::read_to_string(sheet.path()).unwrap();
        assert!(raw.contains("\"my_status\""));
    }

    #[test]
    fn empty_write_clears_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut sheet = JsonSheet::new(dir.path().join("sheet.json"));
        sheet.write_rows(&[vec!["x".to_string()]]).unwrap();

        sheet.write_rows(&[]).unwrap();

        assert!(sheet.read_rows().unwrap().is_empty());
    }

    #[test]
    fn foreign_columns_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheet.json");
        std::fs::write(&path, r#"{"columns":["a","b"],"rows":[]}"#).unwrap();

        let err = JsonSheet::new(path).read_rows().unwrap_err();
        assert!(matches!(err, RowSyncError::Sheet(_)));
    }
}
