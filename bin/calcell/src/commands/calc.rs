use calcell_core::{format_decimal, parse_decimal, Config, Error, Paths};
use calcell_ops::Calculator;
use calcell_storage::render_line;
use rust_decimal::Decimal;

use super::open_calculator;

/// A parsed postfix calculation: `<a> <b> <operation>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Postfix {
    pub a: Decimal,
    pub b: Decimal,
    pub operation: String,
}

/// Parse `a b op`. The operation name is lower-cased.
pub fn parse_postfix(parts: &[&str]) -> calcell_core::Result<Postfix> {
    let [a, b, operation] = parts else {
        return Err(Error::InvalidOperand(
            "commands must have exactly 3 parts (e.g. '4 3 add')".to_string(),
        ));
    };
    Ok(Postfix {
        a: parse_decimal(a)?,
        b: parse_decimal(b)?,
        operation: operation.to_lowercase(),
    })
}

/// Run one calculation and render it as `a <sym> b = result`.
pub fn evaluate(calc: &mut Calculator, config: &Config, postfix: &Postfix) -> calcell_core::Result<String> {
    let result = calc.invoke(&postfix.operation, postfix.a, postfix.b)?;
    Ok(render_line(
        &postfix.operation,
        &postfix.a.to_string(),
        &postfix.b.to_string(),
        &format_decimal(result, &config.display),
    ))
}

/// Print the outcome of a calculation, with the operation list for unknown names.
pub fn print_outcome(calc: &Calculator, outcome: calcell_core::Result<String>) {
    match outcome {
        Ok(line) => println!("{}", line),
        Err(e @ Error::UnknownOperation(_)) => {
            println!("Error: {}", e);
            let names: Vec<String> = calc.available().into_keys().collect();
            println!("Supported operations: {}", names.join(", "));
        }
        Err(e) => println!("Error: {}", e),
    }
}

pub fn run(paths: &Paths, config: &Config, a: &str, b: &str, operation: &str) -> anyhow::Result<()> {
    let postfix = parse_postfix(&[a, b, operation])?;
    let mut calc = open_calculator(paths, config)?;
    let line = evaluate(&mut calc, config, &postfix).map_err(|e| {
        if let Error::UnknownOperation(_) = e {
            let names: Vec<String> = calc.available().into_keys().collect();
            eprintln!("Supported operations: {}", names.join(", "));
        }
        e
    })?;
    println!("{}", line);
    Ok(())
}
