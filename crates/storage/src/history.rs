use calcell_core::{parse_decimal, Error, Result};
use chrono::Local;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Column order of the persisted history file.
pub const HISTORY_FIELDS: [&str; 5] = ["timestamp", "operation", "a", "b", "result"];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One persisted calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub timestamp: String,
    pub operation: String,
    #[serde(deserialize_with = "de_decimal")]
    pub a: Decimal,
    #[serde(deserialize_with = "de_decimal")]
    pub b: Decimal,
    #[serde(deserialize_with = "de_decimal")]
    pub result: Decimal,
}

impl HistoryRecord {
    /// A record stamped with the current local time.
    pub fn new(operation: &str, a: Decimal, b: Decimal, result: Decimal) -> Self {
        Self {
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            operation: operation.to_string(),
            a,
            b,
            result,
        }
    }

    pub fn with_timestamp(mut self, timestamp: &str) -> Self {
        self.timestamp = timestamp.to_string();
        self
    }

    /// Human-readable form, e.g. `5 + 3 = 8`.
    pub fn display_line(&self) -> String {
        render_line(
            &self.operation,
            &self.a.normalize().to_string(),
            &self.b.normalize().to_string(),
            &self.result.normalize().to_string(),
        )
    }
}

/// Infix symbol of the built-in arithmetic operations.
pub fn operation_symbol(operation: &str) -> Option<&'static str> {
    match operation {
        "add" => Some("+"),
        "subtract" => Some("-"),
        "multiply" => Some("*"),
        "divide" => Some("/"),
        _ => None,
    }
}

/// `a + b = r` for arithmetic, `op(a, b) = r` for anything else.
pub fn render_line(operation: &str, a: &str, b: &str, result: &str) -> String {
    match operation_symbol(operation) {
        Some(symbol) => format!("{} {} {} = {}", a, symbol, b, result),
        None => format!("{}({}, {}) = {}", operation, a, b, result),
    }
}

// Legacy files were written from floats, so cells like `8.0` or `1e-05` occur.
fn de_decimal<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Decimal, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_decimal(&raw).map_err(serde::de::Error::custom)
}

/// Ordered, unbounded set of persisted records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryTable {
    records: Vec<HistoryRecord>,
}

impl HistoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<HistoryRecord>) -> Self {
        Self { records }
    }

    pub fn push(&mut self, record: HistoryRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&HistoryRecord> {
        self.records.get(index)
    }

    /// The most recent `limit` records, oldest first. `None` returns everything.
    pub fn recent(&self, limit: Option<usize>) -> &[HistoryRecord] {
        match limit {
            Some(limit) if limit < self.records.len() => {
                &self.records[self.records.len() - limit..]
            }
            _ => &self.records,
        }
    }

    /// Remove the record at `index`, shifting later records down.
    pub fn delete(&mut self, index: usize) -> Result<HistoryRecord> {
        if index >= self.records.len() {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.records.len(),
            });
        }
        Ok(self.records.remove(index))
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn lines(&self) -> Vec<String> {
        self.records.iter().map(HistoryRecord::display_line).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_table() -> HistoryTable {
        HistoryTable::from_records(vec![
            HistoryRecord::new("add", dec!(5), dec!(3), dec!(8)),
            HistoryRecord::new("subtract", dec!(10), dec!(4), dec!(6)),
            HistoryRecord::new("power", dec!(2), dec!(3), dec!(8)),
        ])
    }

    #[test]
    fn test_display_lines() {
        let table = sample_table();
        assert_eq!(
            table.lines(),
            vec!["5 + 3 = 8", "10 - 4 = 6", "power(2, 3) = 8"]
        );
    }

    #[test]
    fn test_timestamp_shape() {
        let record = HistoryRecord::new("divide", dec!(1), dec!(4), dec!(0.25));
        assert_eq!(record.timestamp.len(), 19);
        assert_eq!(&record.timestamp[4..5], "-");
        assert_eq!(&record.timestamp[13..14], ":");
    }

    #[test]
    fn test_recent_limits_to_newest() {
        let table = sample_table();
        assert_eq!(table.recent(None).len(), 3);
        assert_eq!(table.recent(Some(10)).len(), 3);
        let last_two = table.recent(Some(2));
        assert_eq!(last_two[0].operation, "subtract");
        assert_eq!(last_two[1].operation, "power");
        assert!(table.recent(Some(0)).is_empty());
    }

    #[test]
    fn test_delete_is_bounds_checked() {
        let mut table = sample_table();
        let removed = table.delete(1).unwrap();
        assert_eq!(removed.operation, "subtract");
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1).unwrap().operation, "power");

        let err = table.delete(2).unwrap_err();
        assert!(matches!(err, Error::IndexOutOfRange { index: 2, len: 2 }));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_render_line_with_preformatted_values() {
        assert_eq!(render_line("multiply", "2", "3", "6"), "2 * 3 = 6");
        assert_eq!(render_line("power", "2", "10", "1.024e3"), "power(2, 10) = 1.024e3");
        assert_eq!(operation_symbol("divide"), Some("/"));
        assert_eq!(operation_symbol("modulo"), None);
    }
}
