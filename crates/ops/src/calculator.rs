//! The calculator facade.
//!
//! Composes the plugin registry with the command handler. After discovery it
//! holds a dispatch table from operation name to descriptor; every call goes
//! through [`Calculator::invoke`], so callers never build commands themselves.

use calcell_core::{Error, HistoryConfig, Result, CATEGORY_OPERATION};
use calcell_storage::{HistoryRecord, HistoryStore, HistoryTable};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::{Command, CommandHandler, DiscoveryFailure, DiscoveryReport, Plugin, PluginRegistry};

/// Namespaces discovered by default.
pub const DEFAULT_NAMESPACES: &[&str] = &["operations"];

pub struct Calculator {
    registry: PluginRegistry,
    namespaces: Vec<String>,
    operations: BTreeMap<String, Arc<dyn Plugin>>,
    handler: CommandHandler,
    table: HistoryTable,
    store: Option<HistoryStore>,
    auto_save: bool,
    last_discovery: Vec<DiscoveryReport>,
}

impl Calculator {
    /// An in-memory calculator: nothing is read from or written to disk.
    pub fn new(registry: PluginRegistry, history: &HistoryConfig) -> Self {
        let mut calc = Self {
            registry,
            namespaces: DEFAULT_NAMESPACES.iter().map(|s| s.to_string()).collect(),
            operations: BTreeMap::new(),
            handler: CommandHandler::new(history.max_size),
            table: HistoryTable::new(),
            store: None,
            auto_save: history.auto_save,
            last_discovery: Vec::new(),
        };
        calc.reload();
        calc
    }

    /// A calculator backed by a history file. The file is created if missing;
    /// an unreadable file is logged and replaced by an empty table.
    pub fn open(registry: PluginRegistry, history: &HistoryConfig, store: HistoryStore) -> Result<Self> {
        let mut calc = Self::new(registry, history);
        store.ensure_exists()?;
        calc.table = match store.load() {
            Ok(table) => table,
            Err(e) => {
                error!(path = %store.path().display(), error = %e, "Failed to load history");
                HistoryTable::new()
            }
        };
        calc.store = Some(store);
        Ok(calc)
    }

    /// Built-in operations, default history settings, no persistence.
    pub fn in_memory() -> Self {
        Self::new(PluginRegistry::with_builtins(), &HistoryConfig::default())
    }

    /// Discover a namespace right away. It joins the set rediscovered by
    /// `reload` only if it resolved.
    pub fn add_namespace(&mut self, namespace: &str) -> DiscoveryReport {
        let report = self.registry.discover(namespace);
        let unresolved = report
            .failures
            .iter()
            .any(|f| matches!(f, DiscoveryFailure::Unresolved { .. }));
        if unresolved {
            return report;
        }
        if !self.namespaces.iter().any(|ns| ns == namespace) {
            self.namespaces.push(namespace.to_string());
        }
        let operations = report.registered.iter().filter(|k| k.is_operation()).count();
        info!(namespace, operations, "Namespace added");
        self.rebuild_operations();
        report
    }

    /// Re-run discovery over every namespace and rebuild the dispatch table.
    pub fn reload(&mut self) -> &[DiscoveryReport] {
        let namespaces = self.namespaces.clone();
        self.last_discovery = namespaces
            .iter()
            .map(|ns| self.registry.discover(ns))
            .collect();
        self.rebuild_operations();
        &self.last_discovery
    }

    fn rebuild_operations(&mut self) {
        self.operations = self.registry.get_all(Some(CATEGORY_OPERATION));
        debug!(count = self.operations.len(), "Operation table rebuilt");
    }

    /// Invoke an operation by name.
    pub fn invoke(&mut self, name: &str, a: Decimal, b: Decimal) -> Result<Decimal> {
        let factory = self
            .operations
            .get(name)
            .map(|plugin| plugin.build())
            .ok_or_else(|| Error::UnknownOperation(name.to_string()))?;

        let result = self.handler.execute(factory(a, b))?;

        self.table.push(HistoryRecord::new(name, a, b, result));
        if self.auto_save {
            self.persist();
        }
        Ok(result)
    }

    /// Operation name -> category tag for every callable operation.
    pub fn available(&self) -> BTreeMap<String, String> {
        self.operations
            .iter()
            .map(|(name, plugin)| (name.clone(), plugin.category().to_string()))
            .collect()
    }

    pub fn describe(&self, name: &str) -> Option<&'static str> {
        self.operations.get(name).map(|p| p.description())
    }

    pub fn is_available(&self, name: &str) -> bool {
        self.operations.contains_key(name)
    }

    pub fn discovery_reports(&self) -> &[DiscoveryReport] {
        &self.last_discovery
    }

    /// Commands executed in this session, bounded by `history.maxSize`.
    pub fn history(&self) -> &VecDeque<Box<dyn Command>> {
        self.handler.history()
    }

    pub fn handler(&self) -> &CommandHandler {
        &self.handler
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// Mutable registry access for registering providers before a `reload`.
    pub fn registry_mut(&mut self) -> &mut PluginRegistry {
        &mut self.registry
    }

    pub fn store(&self) -> Option<&HistoryStore> {
        self.store.as_ref()
    }

    /// Persisted records, oldest first.
    pub fn records(&self) -> &[HistoryRecord] {
        self.table.records()
    }

    pub fn recent_records(&self, limit: Option<usize>) -> &[HistoryRecord] {
        self.table.recent(limit)
    }

    pub fn history_lines(&self) -> Vec<String> {
        self.table.lines()
    }

    pub fn add_record(&mut self, record: HistoryRecord) {
        self.table.push(record);
        self.persist();
    }

    pub fn delete_record(&mut self, index: usize) -> Result<HistoryRecord> {
        let removed = self.table.delete(index).map_err(|e| {
            error!(index, error = %e, "Failed to delete history record");
            e
        })?;
        debug!(index, remaining = self.table.len(), "History record deleted");
        self.persist();
        Ok(removed)
    }

    /// Clear both the session command log and the persisted table.
    pub fn clear_history(&mut self) {
        self.handler.clear_history();
        self.table.clear();
        self.persist();
        info!("History cleared");
    }

    /// Replace the persisted table with the contents of `path`
    /// (or the attached store). Returns the number of records loaded.
    pub fn load_history(&mut self, path: Option<&Path>) -> Result<usize> {
        let store = self.resolve_store(path)?;
        self.table = store.load()?;
        info!(path = %store.path().display(), count = self.table.len(), "History loaded");
        Ok(self.table.len())
    }

    /// Write the persisted table to `path` (or the attached store).
    pub fn save_history(&self, path: Option<&Path>) -> Result<PathBuf> {
        let store = self.resolve_store(path)?;
        store.save(&self.table)?;
        info!(path = %store.path().display(), count = self.table.len(), "History saved");
        Ok(store.path().to_path_buf())
    }

    fn resolve_store(&self, path: Option<&Path>) -> Result<HistoryStore> {
        match (path, &self.store) {
            (Some(path), _) => Ok(HistoryStore::new(path.to_path_buf())),
            (None, Some(store)) => Ok(store.clone()),
            (None, None) => Err(Error::Storage("No history file configured".to_string())),
        }
    }

    // Persistence failures never fail the calculation that triggered them.
    fn persist(&self) {
        let Some(store) = &self.store else {
            return;
        };
        if let Err(e) = store.save(&self.table) {
            warn!(path = %store.path().display(), error = %e, "Failed to save history");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::AddCommand;
    use crate::CommandFactory;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    struct ModuloCommand {
        a: Decimal,
        b: Decimal,
    }

    impl std::fmt::Display for ModuloCommand {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "ModuloCommand({}, {})", self.a, self.b)
        }
    }

    impl Command for ModuloCommand {
        fn name(&self) -> &str {
            "modulo"
        }
        fn operands(&self) -> (Decimal, Decimal) {
            (self.a, self.b)
        }
        fn execute(&self) -> Result<Decimal> {
            self.a.checked_rem(self.b).ok_or(Error::DivisionByZero)
        }
    }

    struct ModuloPlugin;

    impl Plugin for ModuloPlugin {
        fn name(&self) -> &'static str {
            "modulo"
        }
        fn category(&self) -> &'static str {
            CATEGORY_OPERATION
        }
        fn build(&self) -> CommandFactory {
            |a, b| -> Box<dyn Command> { Box::new(ModuloCommand { a, b }) }
        }
    }

    fn modulo_provider() -> Result<Vec<Arc<dyn Plugin>>> {
        Ok(vec![Arc::new(ModuloPlugin)])
    }

    fn history_config(max_size: usize) -> HistoryConfig {
        HistoryConfig {
            max_size,
            ..HistoryConfig::default()
        }
    }

    #[test]
    fn test_end_to_end_scenario() {
        let mut calc = Calculator::in_memory();
        assert_eq!(calc.invoke("add", dec!(5), dec!(3)).unwrap(), dec!(8));
        assert_eq!(calc.invoke("subtract", dec!(10), dec!(4)).unwrap(), dec!(6));

        let err = calc.invoke("divide", dec!(10), dec!(0)).unwrap_err();
        assert!(matches!(err, Error::DivisionByZero));

        assert_eq!(calc.history().len(), 2);
        assert_eq!(calc.history().back().unwrap().name(), "subtract");
        assert_eq!(calc.records().len(), 2);
    }

    #[test]
    fn test_available_lists_operations() {
        let calc = Calculator::in_memory();
        let available = calc.available();
        let names: Vec<&str> = available.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["add", "divide", "multiply", "subtract"]);
        assert!(available.values().all(|c| c == CATEGORY_OPERATION));
        assert!(calc.discovery_reports().iter().all(DiscoveryReport::is_clean));
    }

    #[test]
    fn test_unknown_operation() {
        let mut calc = Calculator::in_memory();
        let err = calc.invoke("power", dec!(2), dec!(3)).unwrap_err();
        assert!(matches!(err, Error::UnknownOperation(ref n) if n == "power"));
        assert!(calc.history().is_empty());
        assert!(calc.records().is_empty());
    }

    #[test]
    fn test_bounded_history_scenario() {
        let mut calc = Calculator::new(PluginRegistry::with_builtins(), &history_config(3));
        for a in 1..=5 {
            calc.invoke("add", Decimal::from(a), dec!(1)).unwrap();
        }
        let a_values: Vec<Decimal> = calc.history().iter().map(|c| c.operands().0).collect();
        assert_eq!(a_values, vec![dec!(3), dec!(4), dec!(5)]);
        // The persisted table is not bounded.
        assert_eq!(calc.records().len(), 5);
    }

    #[test]
    fn test_failed_call_keeps_history_length() {
        let mut calc = Calculator::in_memory();
        calc.invoke("multiply", dec!(2), dec!(2)).unwrap();
        for a in [dec!(0), dec!(1), dec!(-2.5)] {
            assert!(calc.invoke("divide", a, dec!(0)).is_err());
            assert_eq!(calc.history().len(), 1);
            assert_eq!(calc.records().len(), 1);
        }
    }

    #[test]
    fn test_reload_is_idempotent() {
        let mut calc = Calculator::in_memory();
        let before = calc.available();
        calc.reload();
        calc.reload();
        assert_eq!(calc.available(), before);
    }

    #[test]
    fn test_reload_picks_up_runtime_plugins() {
        let mut calc = Calculator::in_memory();
        assert!(!calc.is_available("modulo"));

        calc.registry_mut().register_provider("operations.extra", modulo_provider);
        calc.reload();

        assert!(calc.is_available("modulo"));
        assert_eq!(calc.invoke("modulo", dec!(10), dec!(3)).unwrap(), dec!(1));
        assert_eq!(calc.handler().find_by_name("modulo").len(), 1);
        assert_eq!(calc.history_lines(), vec!["modulo(10, 3) = 1"]);
    }

    #[test]
    fn test_add_namespace() {
        let mut calc = Calculator::in_memory();
        calc.registry_mut().register_provider("extras", modulo_provider);
        let report = calc.add_namespace("extras");
        assert!(report.is_clean());
        assert!(calc.is_available("modulo"));
        assert_eq!(calc.reload().len(), 2);

        let report = calc.add_namespace("nowhere");
        assert!(!report.is_clean());
        assert_eq!(calc.available().len(), 5);
        // An unresolved namespace is not retried on reload.
        let reports = calc.reload();
        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(DiscoveryReport::is_clean));

        // Once a provider exists the namespace can be added.
        calc.registry_mut().register_provider("nowhere", modulo_provider);
        assert!(calc.add_namespace("nowhere").is_clean());
        assert_eq!(calc.reload().len(), 3);
    }

    #[test]
    fn test_underflow_leaves_history_unchanged() {
        let mut calc = Calculator::in_memory();
        calc.invoke("add", dec!(1), dec!(1)).unwrap();

        let tiny = Decimal::new(1, 15);
        let err = calc.invoke("multiply", tiny, tiny).unwrap_err();
        assert!(matches!(err, Error::Underflow(_)));
        let err = calc.invoke("divide", Decimal::new(1, 20), dec!(10000000000)).unwrap_err();
        assert!(matches!(err, Error::Underflow(_)));

        assert_eq!(calc.history().len(), 1);
        assert_eq!(calc.records().len(), 1);

        // The boundary value itself is exact and usable as a divisor.
        let smallest = calc.invoke("multiply", Decimal::new(1, 14), Decimal::new(1, 14)).unwrap();
        assert_eq!(smallest, Decimal::new(1, 28));
        assert_eq!(calc.invoke("divide", Decimal::new(1, 28), smallest).unwrap(), dec!(1));
        assert_eq!(calc.history().len(), 3);
    }

    #[test]
    fn test_history_lines_and_latest() {
        let mut calc = Calculator::in_memory();
        calc.invoke("add", dec!(0.1), dec!(0.2)).unwrap();
        calc.invoke("divide", dec!(10), dec!(4)).unwrap();
        assert_eq!(calc.history_lines(), vec!["0.1 + 0.2 = 0.3", "10 / 4 = 2.5"]);
        assert_eq!(
            calc.handler().latest().unwrap().to_string(),
            "DivideCommand(10, 4)"
        );
        assert_eq!(calc.recent_records(Some(1))[0].operation, "divide");
    }

    #[test]
    fn test_clear_history_clears_both_logs() {
        let mut calc = Calculator::in_memory();
        calc.invoke("add", dec!(1), dec!(2)).unwrap();
        calc.clear_history();
        assert!(calc.history().is_empty());
        assert!(calc.records().is_empty());
    }

    #[test]
    fn test_delete_record_bounds() {
        let mut calc = Calculator::in_memory();
        calc.invoke("add", dec!(1), dec!(2)).unwrap();
        calc.invoke("add", dec!(3), dec!(4)).unwrap();

        let removed = calc.delete_record(0).unwrap();
        assert_eq!(removed.result, dec!(3));
        assert_eq!(calc.records().len(), 1);

        let err = calc.delete_record(5).unwrap_err();
        assert!(matches!(err, Error::IndexOutOfRange { index: 5, len: 1 }));
    }

    #[test]
    fn test_persists_to_store() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data/history.csv");
        let config = HistoryConfig::default();

        {
            let mut calc = Calculator::open(
                PluginRegistry::with_builtins(),
                &config,
                HistoryStore::new(path.clone()),
            )
            .unwrap();
            assert!(path.exists());
            calc.invoke("multiply", dec!(4.5), dec!(2.5)).unwrap();
            calc.invoke("subtract", dec!(3), dec!(8)).unwrap();
        }

        let calc = Calculator::open(
            PluginRegistry::with_builtins(),
            &config,
            HistoryStore::new(path),
        )
        .unwrap();
        assert_eq!(calc.history_lines(), vec!["4.5 * 2.5 = 11.25", "3 - 8 = -5"]);
        // The session command log starts empty on every run.
        assert!(calc.history().is_empty());
    }

    #[test]
    fn test_load_and_save_explicit_paths() {
        let dir = TempDir::new().unwrap();
        let mut calc = Calculator::in_memory();
        assert!(matches!(calc.save_history(None), Err(Error::Storage(_))));

        calc.invoke("add", dec!(2), dec!(2)).unwrap();
        calc.add_record(
            HistoryRecord::new("add", dec!(1), dec!(1), dec!(2)).with_timestamp("2024-01-01 00:00:00"),
        );
        let backup = dir.path().join("backup.csv");
        assert_eq!(calc.save_history(Some(&backup)).unwrap(), backup);

        calc.clear_history();
        assert_eq!(calc.load_history(Some(&backup)).unwrap(), 2);
        assert_eq!(calc.records()[1].timestamp, "2024-01-01 00:00:00");
    }

    #[test]
    fn test_overwritten_operation_is_dispatched() {
        struct LoudAdd;
        impl Plugin for LoudAdd {
            fn name(&self) -> &'static str {
                "add"
            }
            fn category(&self) -> &'static str {
                CATEGORY_OPERATION
            }
            fn description(&self) -> &'static str {
                "loud"
            }
            fn build(&self) -> CommandFactory {
                |a, b| -> Box<dyn Command> { Box::new(AddCommand::new(a, b)) }
            }
        }

        let mut calc = Calculator::in_memory();
        calc.registry_mut()
            .register_provider("operations.zz", || -> Result<Vec<Arc<dyn Plugin>>> {
                Ok(vec![Arc::new(LoudAdd)])
            });
        calc.reload();
        assert_eq!(calc.describe("add"), Some("loud"));
        assert_eq!(calc.available().len(), 4);
    }
}
