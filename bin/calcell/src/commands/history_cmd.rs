use calcell_core::{format_decimal, parse_decimal, Config, Paths};
use calcell_ops::Calculator;
use calcell_storage::HistoryRecord;
use std::path::PathBuf;

use super::open_calculator;

// ── Shared by the subcommands and the interactive shells ────────────────────

/// Resolve an optional file argument: the configured history file by default,
/// relative paths under the data directory.
pub fn resolve_file(paths: &Paths, config: &Config, file: Option<&str>) -> PathBuf {
    match file {
        Some(file) => paths.data_file(config, file),
        None => paths.history_file(config),
    }
}

pub fn print_lines(calc: &Calculator, limit: Option<usize>) {
    let records = calc.recent_records(limit);
    if records.is_empty() {
        println!("No calculations in history");
        return;
    }
    println!();
    println!("📜 Calculation History");
    for (idx, record) in records.iter().enumerate() {
        println!("{}. {}", idx + 1, record.display_line());
    }
}

pub fn print_detail(calc: &Calculator, config: &Config, limit: Option<usize>) {
    let records = calc.recent_records(limit);
    if records.is_empty() {
        println!("No calculations in history");
        return;
    }
    let offset = calc.records().len() - records.len();

    println!();
    println!("📜 Detailed Calculation History");
    println!(
        "  {:<5} {:<20} {:<10} {:>14} {:>14} {:>16}",
        "idx", "timestamp", "operation", "a", "b", "result"
    );
    for (i, record) in records.iter().enumerate() {
        println!(
            "  {:<5} {:<20} {:<10} {:>14} {:>14} {:>16}",
            offset + i,
            record.timestamp,
            record.operation,
            record.a.normalize(),
            record.b.normalize(),
            format_decimal(record.result, &config.display)
        );
    }
}

pub fn load_into(calc: &mut Calculator, paths: &Paths, config: &Config, file: Option<&str>) {
    let path = resolve_file(paths, config, file);
    match calc.load_history(Some(&path)) {
        Ok(count) => println!("Loaded {} records from {}", count, path.display()),
        Err(e) => println!("Error loading history: {}", e),
    }
}

pub fn save_from(calc: &Calculator, paths: &Paths, config: &Config, file: Option<&str>) {
    let path = resolve_file(paths, config, file);
    match calc.save_history(Some(&path)) {
        Ok(path) => println!("History saved to {}", path.display()),
        Err(e) => println!("Error saving history: {}", e),
    }
}

pub fn clear_all(calc: &mut Calculator) {
    calc.clear_history();
    println!("History cleared");
}

pub fn delete_at(calc: &mut Calculator, index: &str) {
    let Ok(index) = index.trim().parse::<usize>() else {
        println!("Invalid index: {}", index);
        return;
    };
    match calc.delete_record(index) {
        Ok(_) => println!("Record at index {} deleted", index),
        Err(e) => println!("Error: {}", e),
    }
}

/// Parse `<op> <a> <b> <result>` into a record stamped now.
pub fn parse_record(parts: &[&str]) -> calcell_core::Result<HistoryRecord> {
    let [operation, a, b, result, ..] = parts else {
        return Err(calcell_core::Error::InvalidOperand(
            "usage: add <operation> <a> <b> <result>".to_string(),
        ));
    };
    Ok(HistoryRecord::new(
        operation,
        parse_decimal(a)?,
        parse_decimal(b)?,
        parse_decimal(result)?,
    ))
}

pub fn add_parts(calc: &mut Calculator, parts: &[&str]) {
    match parse_record(parts) {
        Ok(record) => {
            calc.add_record(record);
            println!("Record added to history");
        }
        Err(e) => println!("Error: {}", e),
    }
}

// ── `calcell history ...` ────────────────────────────────────────────────────

pub fn list(paths: &Paths, config: &Config, limit: Option<usize>, detail: bool) -> anyhow::Result<()> {
    let calc = open_calculator(paths, config)?;
    if detail {
        print_detail(&calc, config, limit);
    } else {
        print_lines(&calc, limit);
    }
    Ok(())
}

pub fn load(paths: &Paths, config: &Config, file: Option<&str>) -> anyhow::Result<()> {
    let mut calc = open_calculator(paths, config)?;
    let path = resolve_file(paths, config, file);
    let count = calc.load_history(Some(&path))?;
    // Loading from elsewhere makes that content the active history.
    calc.save_history(None)?;
    println!("Loaded {} records from {}", count, path.display());
    Ok(())
}

pub fn save(paths: &Paths, config: &Config, file: Option<&str>) -> anyhow::Result<()> {
    let calc = open_calculator(paths, config)?;
    let path = calc.save_history(Some(&resolve_file(paths, config, file)))?;
    println!("History saved to {}", path.display());
    Ok(())
}

pub fn clear(paths: &Paths, config: &Config) -> anyhow::Result<()> {
    let mut calc = open_calculator(paths, config)?;
    clear_all(&mut calc);
    Ok(())
}

pub fn delete(paths: &Paths, config: &Config, index: usize) -> anyhow::Result<()> {
    let mut calc = open_calculator(paths, config)?;
    calc.delete_record(index)?;
    println!("Record at index {} deleted", index);
    Ok(())
}

pub fn add(paths: &Paths, config: &Config, operation: &str, a: &str, b: &str, result: &str) -> anyhow::Result<()> {
    let record = parse_record(&[operation, a, b, result])?;
    let mut calc = open_calculator(paths, config)?;
    calc.add_record(record);
    println!("Record added to history");
    Ok(())
}
