pub mod calculator;
pub mod handler;
pub mod operations;
pub mod registry;

use calcell_core::{CapabilityKey, Result};
use rust_decimal::Decimal;
use std::fmt;
use std::sync::Arc;

pub use calculator::Calculator;
pub use handler::CommandHandler;
pub use registry::{DiscoveryFailure, DiscoveryReport, PluginRegistry};

/// One bound invocation of an operation over two operands.
///
/// Operands are fixed at construction. `Display` is the stable textual form
/// used in logs and history listings (e.g. `AddCommand(5, 3)`).
pub trait Command: fmt::Display + Send + Sync {
    fn name(&self) -> &str;
    fn operands(&self) -> (Decimal, Decimal);
    fn execute(&self) -> Result<Decimal>;
}

/// Constructor for a capability's executable unit.
pub type CommandFactory = fn(Decimal, Decimal) -> Box<dyn Command>;

/// Capability descriptor: a unique `(category, name)` plus the factory for its command.
pub trait Plugin: Send + Sync {
    fn name(&self) -> &'static str;
    fn category(&self) -> &'static str;
    fn description(&self) -> &'static str {
        ""
    }
    fn build(&self) -> CommandFactory;

    fn key(&self) -> CapabilityKey {
        CapabilityKey::new(self.category(), self.name())
    }
}

/// Source of plugins registered under a namespace.
///
/// Any `Fn() -> Result<Vec<Arc<dyn Plugin>>>` is a provider, so a plain
/// function listing statically linked plugins is enough.
pub trait PluginProvider: Send + Sync {
    fn plugins(&self) -> Result<Vec<Arc<dyn Plugin>>>;
}

impl<F> PluginProvider for F
where
    F: Fn() -> Result<Vec<Arc<dyn Plugin>>> + Send + Sync,
{
    fn plugins(&self) -> Result<Vec<Arc<dyn Plugin>>> {
        self()
    }
}
