//! Decimal parsing and display.
//!
//! All arithmetic runs on `rust_decimal::Decimal`, a base-10 representation,
//! so `0.1 + 0.2` is exactly `0.3`. Floats never enter the pipeline.

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::config::{DisplayConfig, OutputFormat};
use crate::error::{Error, Result};

/// Parse an operand. Accepts plain decimals and scientific notation
/// (`1e-05`, as written by float-backed history files).
///
/// Well-formed numbers that `Decimal` cannot hold (too large, or non-zero
/// but below 1e-28) are rejected with a range message, never rounded to zero.
pub fn parse_decimal(input: &str) -> Result<Decimal> {
    let s = input.trim();
    if s.is_empty() {
        return Err(Error::InvalidOperand("empty value".to_string()));
    }
    if !is_numeric_literal(s) {
        return Err(Error::InvalidOperand(format!("'{}' is not a valid number", s)));
    }
    let value = Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .map_err(|_| out_of_range(s))?;
    if value.is_zero() && has_nonzero_digit(s) {
        return Err(out_of_range(s));
    }
    Ok(value)
}

fn out_of_range(s: &str) -> Error {
    Error::InvalidOperand(format!("'{}' is outside the supported decimal range", s))
}

/// `[+-]digits[.digits][(e|E)[+-]digits]`
fn is_numeric_literal(s: &str) -> bool {
    fn digits(s: &str) -> bool {
        !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
    }
    fn unsigned(s: &str) -> &str {
        s.strip_prefix(['+', '-']).unwrap_or(s)
    }

    let (mantissa, exponent) = match s.split_once(['e', 'E']) {
        Some((m, e)) => (m, Some(e)),
        None => (s, None),
    };
    let mantissa_ok = match unsigned(mantissa).split_once('.') {
        Some((int, frac)) => digits(int) && digits(frac),
        None => digits(unsigned(mantissa)),
    };
    mantissa_ok && exponent.map_or(true, |e| digits(unsigned(e)))
}

fn has_nonzero_digit(s: &str) -> bool {
    s.split(['e', 'E'])
        .next()
        .is_some_and(|m| m.bytes().any(|b| (b'1'..=b'9').contains(&b)))
}

/// Render a value for display according to the configured format.
pub fn format_decimal(value: Decimal, display: &DisplayConfig) -> String {
    match display.output_format {
        OutputFormat::Scientific => format!("{:e}", value.normalize()),
        OutputFormat::Standard => {
            let rounded = value.round_dp(display.decimal_precision).normalize();
            if integer_digits(rounded) > display.scientific_threshold as usize {
                format!("{:e}", rounded)
            } else {
                rounded.to_string()
            }
        }
    }
}

fn integer_digits(value: Decimal) -> usize {
    value.trunc().abs().normalize().to_string().len()
}
