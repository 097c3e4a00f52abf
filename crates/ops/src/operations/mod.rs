//! Built-in arithmetic capabilities.
//!
//! Each operation lives in its own module with a command (the executable
//! unit) and a plugin (its descriptor). To add one, implement both traits
//! and list the plugin in [`arithmetic_plugins`].

pub mod add;
pub mod divide;
pub mod multiply;
pub mod subtract;

use calcell_core::{Error, Result};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::warn;

use crate::Plugin;

pub use add::{AddCommand, AddPlugin};
pub use divide::{DivideCommand, DividePlugin};
pub use multiply::{MultiplyCommand, MultiplyPlugin};
pub use subtract::{SubtractCommand, SubtractPlugin};

/// Namespace the arithmetic provider is registered under.
pub const ARITHMETIC_NAMESPACE: &str = "operations.arithmetic";

/// Provider for the four statically linked operations.
pub fn arithmetic_plugins() -> Result<Vec<Arc<dyn Plugin>>> {
    Ok(vec![
        Arc::new(AddPlugin),
        Arc::new(SubtractPlugin),
        Arc::new(MultiplyPlugin),
        Arc::new(DividePlugin),
    ])
}

/// Decimal places `Decimal` can carry.
const MAX_SCALE: u32 = 28;

/// Significant digits an inexact result must keep. Below this, rounding at the
/// last decimal place has destroyed the value and the result is an underflow.
pub const MIN_SIGNIFICANT_DIGITS: u32 = 15;

fn significant_digits(value: Decimal) -> u32 {
    let mantissa = value.normalize().mantissa().unsigned_abs();
    if mantissa == 0 {
        0
    } else {
        mantissa.ilog10() + 1
    }
}

fn factor_count(mut n: u128, p: u128) -> u32 {
    let mut count = 0;
    while n != 0 && n % p == 0 {
        n /= p;
        count += 1;
    }
    count
}

/// Whether `a * b` fits in `MAX_SCALE` decimal places without rounding.
fn product_is_exact(a: Decimal, b: Decimal) -> bool {
    if a.is_zero() || b.is_zero() {
        return true;
    }
    let (a, b) = (a.normalize(), b.normalize());
    let excess = (a.scale() + b.scale()).saturating_sub(MAX_SCALE);
    if excess == 0 {
        return true;
    }
    // The exact product drops `excess` places only if its mantissa is divisible by 10^excess.
    let (ma, mb) = (a.mantissa().unsigned_abs(), b.mantissa().unsigned_abs());
    factor_count(ma, 2) + factor_count(mb, 2) >= excess
        && factor_count(ma, 5) + factor_count(mb, 5) >= excess
}

/// Reject a rounded result that kept fewer than [`MIN_SIGNIFICANT_DIGITS`].
fn ensure_precision<F>(value: Decimal, exact: bool, expression: F) -> Result<Decimal>
where
    F: FnOnce() -> String,
{
    if exact || significant_digits(value) >= MIN_SIGNIFICANT_DIGITS {
        return Ok(value);
    }
    let expression = expression();
    warn!(expression = %expression, rounded = %value, "Result below representable precision");
    Err(Error::Underflow(expression))
}
