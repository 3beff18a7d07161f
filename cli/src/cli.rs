//! CLI command definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for zia
#[derive(Parser, Debug)]
#[command(name = "zia")]
#[command(author, version, about = "AI agent that calls tools from local provider processes")]
#[command(long_about = r#"
zia runs a conversational agent that can call tools. Tools come from
external provider processes (configured in servers.toml) that speak
newline-delimited JSON-RPC over stdio.

Configuration files are loaded from (in priority order):
1. ZIA_* environment variables (e.g. ZIA_MODEL__MODEL)
2. --config <path>     Explicit config file
3. ./zia.toml          Project-level config
4. ~/.config/zia/config.toml   Global config

Example:
  zia run "What files are in this directory?"
  zia run --image screenshot.png "What does this error mean?"
  zia chat
  zia servers
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Path to the provider process file (overrides [servers] config_path)
    #[arg(long, global = true, value_name = "PATH")]
    pub servers: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a single agent turn and print the answer
    Run(RunArgs),

    /// Interactive chat; one conversation across turns
    Chat(ChatArgs),

    /// Start the provider processes and list their tools
    Servers,

    /// Show configuration file locations and the merged configuration
    Config,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// The message to send
    pub message: String,

    /// Attach an image (png, jpeg, gif or webp)
    #[arg(long, value_name = "PATH")]
    pub image: Option<PathBuf>,

    #[command(flatten)]
    pub agent: AgentArgs,
}

#[derive(Args, Debug)]
pub struct ChatArgs {
    #[command(flatten)]
    pub agent: AgentArgs,
}

/// Overrides for the `[agent]` section
#[derive(Args, Debug, Default)]
pub struct AgentArgs {
    /// Maximum model calls per turn
    #[arg(long, value_name = "N")]
    pub max_steps: Option<usize>,

    /// Wall-clock budget per turn, in seconds
    #[arg(long, value_name = "SECS")]
    pub time_budget: Option<u64>,

    /// System prompt sent with every model call
    #[arg(long, value_name = "TEXT")]
    pub system: Option<String>,

    /// Suppress tool activity on stderr
    #[arg(short, long)]
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_with_image() {
        let cli = Cli::parse_from(["zia", "-vv", "run", "--image", "a.png", "describe"]);
        assert_eq!(cli.verbose, 2);
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.message, "describe");
        assert_eq!(args.image, Some(PathBuf::from("a.png")));
    }

    #[test]
    fn test_parse_chat_overrides() {
        let cli = Cli::parse_from(["zia", "chat", "--max-steps", "3", "--time-budget", "60", "-q"]);
        let Command::Chat(args) = cli.command else {
            panic!("expected chat");
        };
        assert_eq!(args.agent.max_steps, Some(3));
        assert_eq!(args.agent.time_budget, Some(60));
        assert!(args.agent.quiet);
    }

    #[test]
    fn test_verify_command() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
