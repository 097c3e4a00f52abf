pub mod history;
pub mod store;

pub use history::{operation_symbol, render_line, HistoryRecord, HistoryTable, HISTORY_FIELDS};
pub use store::HistoryStore;
