use calcell_core::{Error, Result, CATEGORY_OPERATION};
use rust_decimal::Decimal;
use std::fmt;
use tracing::debug;

use super::{ensure_precision, product_is_exact};
use crate::{Command, CommandFactory, Plugin};

pub struct MultiplyCommand {
    a: Decimal,
    b: Decimal,
}

impl MultiplyCommand {
    pub fn new(a: Decimal, b: Decimal) -> Self {
        Self { a, b }
    }

    fn boxed(a: Decimal, b: Decimal) -> Box<dyn Command> {
        Box::new(Self::new(a, b))
    }
}

impl Command for MultiplyCommand {
    fn name(&self) -> &str {
        "multiply"
    }

    fn operands(&self) -> (Decimal, Decimal) {
        (self.a, self.b)
    }

    fn execute(&self) -> Result<Decimal> {
        debug!(a = %self.a, b = %self.b, "Multiplying");
        let product = self
            .a
            .checked_mul(self.b)
            .ok_or_else(|| Error::Overflow(format!("{} * {}", self.a, self.b)))?;
        ensure_precision(product, product_is_exact(self.a, self.b), || {
            format!("{} * {}", self.a, self.b)
        })
    }
}

impl fmt::Display for MultiplyCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MultiplyCommand({}, {})", self.a, self.b)
    }
}

pub struct MultiplyPlugin;

impl Plugin for MultiplyPlugin {
    fn name(&self) -> &'static str {
        "multiply"
    }

    fn category(&self) -> &'static str {
        CATEGORY_OPERATION
    }

    fn description(&self) -> &'static str {
        "Product of two operands"
    }

    fn build(&self) -> CommandFactory {
        MultiplyCommand::boxed
    }
}
