use calcell_core::{Error, Result, CATEGORY_OPERATION};
use rust_decimal::Decimal;
use std::fmt;
use tracing::debug;

use crate::{Command, CommandFactory, Plugin};

pub struct AddCommand {
    a: Decimal,
    b: Decimal,
}

impl AddCommand {
    pub fn new(a: Decimal, b: Decimal) -> Self {
        Self { a, b }
    }

    fn boxed(a: Decimal, b: Decimal) -> Box<dyn Command> {
        Box::new(Self::new(a, b))
    }
}

impl Command for AddCommand {
    fn name(&self) -> &str {
        "add"
    }

    fn operands(&self) -> (Decimal, Decimal) {
        (self.a, self.b)
    }

    fn execute(&self) -> Result<Decimal> {
        debug!(a = %self.a, b = %self.b, "Adding");
        self.a
            .checked_add(self.b)
            .ok_or_else(|| Error::Overflow(format!("{} + {}", self.a, self.b)))
    }
}

impl fmt::Display for AddCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AddCommand({}, {})", self.a, self.b)
    }
}

pub struct AddPlugin;

impl Plugin for AddPlugin {
    fn name(&self) -> &'static str {
        "add"
    }

    fn category(&self) -> &'static str {
        CATEGORY_OPERATION
    }

    fn description(&self) -> &'static str {
        "Sum of two operands"
    }

    fn build(&self) -> CommandFactory {
        AddCommand::boxed
    }
}
