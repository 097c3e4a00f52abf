use calcell_core::{Error, Result, CATEGORY_OPERATION};
use rust_decimal::Decimal;
use std::fmt;
use tracing::debug;

use crate::{Command, CommandFactory, Plugin};

pub struct SubtractCommand {
    a: Decimal,
    b: Decimal,
}

impl SubtractCommand {
    pub fn new(a: Decimal, b: Decimal) -> Self {
        Self { a, b }
    }

    fn boxed(a: Decimal, b: Decimal) -> Box<dyn Command> {
        Box::new(Self::new(a, b))
    }
}

impl Command for SubtractCommand {
    fn name(&self) -> &str {
        "subtract"
    }

    fn operands(&self) -> (Decimal, Decimal) {
        (self.a, self.b)
    }

    fn execute(&self) -> Result<Decimal> {
        debug!(a = %self.a, b = %self.b, "Subtracting");
        self.a
            .checked_sub(self.b)
            .ok_or_else(|| Error::Overflow(format!("{} - {}", self.a, self.b)))
    }
}

impl fmt::Display for SubtractCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubtractCommand({}, {})", self.a, self.b)
    }
}

pub struct SubtractPlugin;

impl Plugin for SubtractPlugin {
    fn name(&self) -> &'static str {
        "subtract"
    }

    fn category(&self) -> &'static str {
        CATEGORY_OPERATION
    }

    fn description(&self) -> &'static str {
        "Difference of two operands"
    }

    fn build(&self) -> CommandFactory {
        SubtractCommand::boxed
    }
}
