use calcell_core::{Config, Paths};

/// Show the effective configuration (file plus environment overrides) as pretty-printed JSON.
pub fn show(paths: &Paths, config: &Config) -> anyhow::Result<()> {
    let json = serde_json::to_value(config)?;

    println!();
    println!("📋 Current Configuration");
    println!("  File: {}", paths.config_file().display());
    println!("  History: {}", paths.history_file(config).display());
    println!("  Log: {}", paths.log_file(config).display());
    println!();
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
