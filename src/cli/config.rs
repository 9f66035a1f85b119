//! Config command handlers

use super::ConfigInitArgs;
use std::fs;

const EXAMPLE_CONFIG: &str = include_str!("../../scribelink.example.toml");

/// Handle `scribelink config init` command
pub fn handle_config_init(args: &ConfigInitArgs) -> anyhow::Result<()> {
    // Check if file exists
    if args.output.exists() && !args.force {
        anyhow::bail!(
            "File already exists: {}. Use --force to overwrite.",
            args.output.display()
        );
    }

    // Write config file
    fs::write(&args.output, EXAMPLE_CONFIG)?;

    println!("✓ Configuration file created: {}", args.output.display());
    println!("  Edit this file to customize the connector.");

    Ok(())
}
