use anyhow::{Context, Result};
use colored::Colorize;
use zia_infrastructure::ConfigLoader;

use crate::cli::Cli;
use crate::runtime::load_config;

/// Print where configuration comes from and the merged result.
pub fn show_config(cli: &Cli) -> Result<()> {
    println!("Configuration sources (highest priority first):");
    println!("  {:<8} ZIA_* environment variables", "Env");
    for source in ConfigLoader::sources(cli.config.as_deref()) {
        let marker = if source.found {
            "found".green()
        } else {
            "missing".dimmed()
        };
        println!("  {:<8} {} ({})", source.label, source.path.display(), marker);
    }

    let mut config = load_config(cli)?;
    if config.model.api_key.is_some() {
        config.model.api_key = Some("<redacted>".into());
    }
    for token in [&mut config.proxy.access_token, &mut config.proxy.refresh_token] {
        if token.is_some() {
            *token = Some("<redacted>".into());
        }
    }

    let servers = cli
        .servers
        .clone()
        .or_else(|| config.servers.resolved_config_path());
    if let Some(path) = servers {
        println!("\nProvider file: {}", path.display());
    }

    let rendered = toml::to_string_pretty(&config).context("failed to render configuration")?;
    println!("\n{}", rendered);
    Ok(())
}
