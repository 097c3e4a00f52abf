use calcell_core::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::history::{HistoryRecord, HistoryTable, HISTORY_FIELDS};

/// CSV-backed persistence for the history table.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create an empty history file (header only) if none exists yet.
    pub fn ensure_exists(&self) -> Result<()> {
        if self.path.exists() {
            return Ok(());
        }
        self.save(&HistoryTable::new())?;
        debug!(path = %self.path.display(), "Created empty history file");
        Ok(())
    }

    pub fn load(&self) -> Result<HistoryTable> {
        if !self.path.exists() {
            warn!(path = %self.path.display(), "History file not found");
            return Ok(HistoryTable::new());
        }

        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| Error::Storage(format!("CSV open error: {}", e)))?;

        let mut records = Vec::new();
        for row in rdr.deserialize::<HistoryRecord>() {
            let record = row.map_err(|e| Error::Storage(format!("CSV parse error: {}", e)))?;
            records.push(record);
        }

        debug!(path = %self.path.display(), count = records.len(), "Loaded history records");
        Ok(HistoryTable::from_records(records))
    }

    pub fn save(&self, table: &HistoryTable) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Header is written by hand so an empty table still produces one.
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&self.path)
            .map_err(|e| Error::Storage(format!("CSV write error: {}", e)))?;

        wtr.write_record(HISTORY_FIELDS)
            .map_err(|e| Error::Storage(format!("CSV header write error: {}", e)))?;
        for record in table.records() {
            wtr.serialize(record)
                .map_err(|e| Error::Storage(format!("CSV row write error: {}", e)))?;
        }
        wtr.flush()?;

        debug!(path = %self.path.display(), count = table.len(), "Saved history records");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::new(dir.path().join("data/history.csv"));

        let mut table = HistoryTable::new();
        table.push(HistoryRecord::new("add", dec!(0.1), dec!(0.2), dec!(0.3)));
        table.push(
            HistoryRecord::new("divide", dec!(10), dec!(4), dec!(2.5))
                .with_timestamp("2024-01-02 03:04:05"),
        );
        store.save(&table).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, table);
        assert_eq!(loaded.get(1).unwrap().timestamp, "2024-01-02 03:04:05");
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::new(dir.path().join("nope.csv"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_ensure_exists_writes_header() {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::new(dir.path().join("h.csv"));
        store.ensure_exists().unwrap();

        let content = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(content.trim(), "timestamp,operation,a,b,result");
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_loads_float_formatted_cells() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("legacy.csv");
        std::fs::write(
            &path,
            "timestamp,operation,a,b,result\n\
             2024-05-01 10:00:00,add,5.0,3.0,8.0\n\
             2024-05-01 10:00:01,multiply,1e-05,2.0,2e-05\n",
        )
        .unwrap();

        let table = HistoryStore::new(path).load().unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(0).unwrap().result, dec!(8));
        assert_eq!(table.get(1).unwrap().a, dec!(0.00001));
        assert_eq!(table.lines()[0], "5 + 3 = 8");
    }

    #[test]
    fn test_malformed_row_is_storage_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "timestamp,operation,a,b,result\nx,add,one,2,3\n").unwrap();

        let err = HistoryStore::new(path).load().unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
    }
}
