use anyhow::Result;
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;
use zia_application::{AgentProgressNotifier, NoAgentProgress, RunAgentInput};
use zia_domain::Conversation;

use crate::cli::{ChatArgs, Cli};
use crate::commands::ctrl_c_token;
use crate::progress::ConsoleProgress;
use crate::runtime::{Runtime, load_config, system_prompt};

/// A line starting with `/`
#[derive(Debug, PartialEq, Eq)]
enum ChatCommand<'a> {
    Exit,
    Clear,
    Tools,
    Reload,
    Restart(&'a str),
    Help,
    Unknown(&'a str),
}

impl<'a> ChatCommand<'a> {
    fn parse(line: &'a str) -> Option<Self> {
        let rest = line.strip_prefix('/')?;
        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };
        Some(match name {
            "exit" | "quit" | "q" => ChatCommand::Exit,
            "clear" => ChatCommand::Clear,
            "tools" => ChatCommand::Tools,
            "reload" => ChatCommand::Reload,
            "restart" if !arg.is_empty() => ChatCommand::Restart(arg),
            "help" | "?" => ChatCommand::Help,
            _ => ChatCommand::Unknown(rest),
        })
    }
}

fn print_help() {
    println!("Commands:");
    println!("  /tools            List available tools");
    println!("  /reload           Re-read the provider file and restart all providers");
    println!("  /restart <name>   Restart one provider");
    println!("  /clear            Start a new conversation");
    println!("  /exit             Quit");
}

/// Interactive loop over stdin lines; the conversation persists across turns.
pub async fn chat(cli: &Cli, args: &ChatArgs) -> Result<()> {
    let config = load_config(cli)?;
    let system = system_prompt(&config, &args.agent);
    let runtime = Runtime::start(cli, &config, &args.agent).await?;

    let progress: &dyn AgentProgressNotifier = if args.agent.quiet {
        &NoAgentProgress
    } else {
        &ConsoleProgress
    };

    println!(
        "{} ({} tools). Type /help for commands.",
        "zia chat".bold(),
        runtime.registry.len()
    );

    let mut conversation = Conversation::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        eprint!("{} ", ">".cyan());
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = ChatCommand::parse(line) {
            match command {
                ChatCommand::Exit => break,
                ChatCommand::Clear => {
                    conversation.clear();
                    println!("Conversation cleared.");
                }
                ChatCommand::Tools => {
                    for definition in runtime.registry.all_definitions() {
                        println!("  {:<24} {}", definition.name, definition.description);
                    }
                }
                ChatCommand::Reload => match runtime.pool.reload().await {
                    Ok(statuses) => {
                        for status in statuses {
                            println!("  {}: {} ({} tools)", status.name, status.state, status.tool_count);
                        }
                    }
                    Err(e) => eprintln!("{} reload failed: {}", "x".red(), e),
                },
                ChatCommand::Restart(name) => match runtime.pool.restart(name).await {
                    Ok(()) => println!("Restarted '{}'.", name),
                    Err(e) => eprintln!("{} restart failed: {}", "x".red(), e),
                },
                ChatCommand::Help => print_help(),
                ChatCommand::Unknown(other) => {
                    eprintln!("Unknown command: /{} (try /help)", other);
                }
            }
            continue;
        }

        let mut input = RunAgentInput::new(line);
        if let Some(prompt) = &system {
            input = input.with_system_prompt(prompt.clone());
        }

        let token = ctrl_c_token();
        let agent = runtime.agent.clone().with_cancellation(token.clone());
        let result = agent
            .execute_with_progress(&mut conversation, input, progress)
            .await;
        token.cancel();
        match result {
            Ok(output) => println!("\n{}\n", output.display_text()),
            Err(e) if e.is_cancelled() => eprintln!("{} cancelled", "!".yellow()),
            Err(e) => {
                warn!(error = %e, "Turn failed");
                let hint = if e.is_retryable() { " (try again)" } else { "" };
                eprintln!("{} {}{}", "x".red(), e, hint);
            }
        }
    }

    runtime.shutdown().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(ChatCommand::parse("hello"), None);
        assert_eq!(ChatCommand::parse("/exit"), Some(ChatCommand::Exit));
        assert_eq!(ChatCommand::parse("/reload"), Some(ChatCommand::Reload));
        assert_eq!(
            ChatCommand::parse("/restart  music "),
            Some(ChatCommand::Restart("music"))
        );
        assert_eq!(
            ChatCommand::parse("/restart"),
            Some(ChatCommand::Unknown("restart"))
        );
        assert_eq!(ChatCommand::parse("/frob"), Some(ChatCommand::Unknown("frob")));
    }
}
