use calcell_core::{Error, Result, CATEGORY_OPERATION};
use rust_decimal::Decimal;
use std::fmt;
use tracing::{debug, warn};

use super::ensure_precision;
use crate::{Command, CommandFactory, Plugin};

pub struct DivideCommand {
    a: Decimal,
    b: Decimal,
}

impl DivideCommand {
    pub fn new(a: Decimal, b: Decimal) -> Self {
        Self { a, b }
    }

    fn boxed(a: Decimal, b: Decimal) -> Box<dyn Command> {
        Box::new(Self::new(a, b))
    }
}

impl Command for DivideCommand {
    fn name(&self) -> &str {
        "divide"
    }

    fn operands(&self) -> (Decimal, Decimal) {
        (self.a, self.b)
    }

    fn execute(&self) -> Result<Decimal> {
        debug!(a = %self.a, b = %self.b, "Dividing");
        // Exact comparison: 0, 0.0 and -0 are all zero, 1e-28 is not.
        if self.b.is_zero() {
            warn!(a = %self.a, b = %self.b, "Division by zero attempted");
            return Err(Error::DivisionByZero);
        }
        let quotient = self
            .a
            .checked_div(self.b)
            .ok_or_else(|| Error::Overflow(format!("{} / {}", self.a, self.b)))?;
        let exact = quotient.checked_mul(self.b) == Some(self.a);
        ensure_precision(quotient, exact, || format!("{} / {}", self.a, self.b))
    }
}

impl fmt::Display for DivideCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DivideCommand({}, {})", self.a, self.b)
    }
}

pub struct DividePlugin;

impl Plugin for DividePlugin {
    fn name(&self) -> &'static str {
        "divide"
    }

    fn category(&self) -> &'static str {
        CATEGORY_OPERATION
    }

    fn description(&self) -> &'static str {
        "Quotient of two operands; the divisor must not be zero"
    }

    fn build(&self) -> CommandFactory {
        DivideCommand::boxed
    }
}
