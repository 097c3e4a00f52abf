use calcell_core::{Config, Paths};
use calcell_ops::Calculator;

use super::open_calculator;

pub fn print_menu(calc: &Calculator) {
    let available = calc.available();
    if available.is_empty() {
        println!("No plugins available");
        return;
    }

    println!();
    println!("🧮 Available Operations ({} total)", available.len());
    for (name, category) in &available {
        let desc = calc.describe(name).unwrap_or("");
        println!("  {:<12} {:<10} {}", name, category, desc);
    }
}

pub fn run(paths: &Paths, config: &Config) -> anyhow::Result<()> {
    let calc = open_calculator(paths, config)?;
    print_menu(&calc);
    for report in calc.discovery_reports().iter().filter(|r| !r.is_clean()) {
        println!("  ⚠️  {} discovery issues in '{}'", report.failures.len(), report.namespace);
    }
    Ok(())
}
