pub mod calc;
pub mod completions_cmd;
pub mod config_cmd;
pub mod history_cmd;
pub mod menu;
pub mod repl;

use calcell_core::{Config, Paths};
use calcell_ops::{Calculator, PluginRegistry};
use calcell_storage::HistoryStore;

/// Build the calculator over the configured history file, with built-in operations discovered.
pub fn open_calculator(paths: &Paths, config: &Config) -> anyhow::Result<Calculator> {
    let store = HistoryStore::new(paths.history_file(config));
    let calc = Calculator::open(PluginRegistry::with_builtins(), &config.history, store)?;
    Ok(calc)
}
