use anyhow::Result;
use colored::Colorize;

use crate::cli::Cli;
use crate::runtime::{build_pool, load_config};

/// Start every provider once, list its state and tools, then stop.
pub async fn servers(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let pool = build_pool(cli, &config)?;

    if let Some(path) = pool.config_path() {
        println!("Provider file: {}", path.display());
    }
    if pool.configured_names().is_empty() {
        println!("No tool providers configured.");
        return Ok(());
    }

    for status in pool.start_all().await {
        let state = if status.state.is_connected() {
            status.state.to_string().green()
        } else {
            status.state.to_string().red()
        };
        println!("\n{} [{}] {} tools", status.name.bold(), state, status.tool_count);
        if let Some(connection) = pool.connection(&status.name) {
            for tool in connection.tools() {
                let description = tool.description.as_deref().unwrap_or_default();
                println!("  {:<24} {}", tool.name, description);
            }
        }
    }

    pool.stop_all().await;
    Ok(())
}
