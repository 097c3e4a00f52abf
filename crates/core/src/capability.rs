use serde::{Deserialize, Serialize};
use std::fmt;

/// Category tag carried by arithmetic capabilities.
pub const CATEGORY_OPERATION: &str = "operation";

/// Identity of a capability inside the registry index.
///
/// Rendered as `category.name` (e.g. `operation.divide`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CapabilityKey {
    pub category: String,
    pub name: String,
}

impl CapabilityKey {
    pub fn new(category: &str, name: &str) -> Self {
        Self {
            category: category.to_string(),
            name: name.to_string(),
        }
    }

    pub fn is_operation(&self) -> bool {
        self.category == CATEGORY_OPERATION
    }
}

impl fmt::Display for CapabilityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.category, self.name)
    }
}
