pub mod capability;
pub mod config;
pub mod error;
pub mod number;
pub mod paths;

pub use capability::{CapabilityKey, CATEGORY_OPERATION};
pub use config::{Config, DisplayConfig, HistoryConfig, LoggingConfig, OutputFormat};
pub use error::{Error, Result};
pub use number::{format_decimal, parse_decimal};
pub use paths::Paths;
