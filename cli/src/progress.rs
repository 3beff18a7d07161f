//! Tool activity on stderr

use colored::Colorize;
use zia_application::{AgentProgressNotifier, TurnOutcome};
use zia_domain::util::truncate_str;
use zia_domain::{ToolResult, ToolUse};

/// Longest tool result preview printed
const PREVIEW_LEN: usize = 120;

/// Prints each tool call and its outcome to stderr, leaving stdout for
/// the answer.
pub struct ConsoleProgress;

impl ConsoleProgress {
    fn preview(content: &str) -> String {
        let first_line = content.lines().next().unwrap_or_default();
        let preview = truncate_str(first_line, PREVIEW_LEN);
        if preview.len() < content.trim_end().len() {
            format!("{}...", preview)
        } else {
            preview.to_string()
        }
    }
}

impl AgentProgressNotifier for ConsoleProgress {
    fn on_tool_call(&self, call: &ToolUse) {
        let args: Vec<&str> = call.input.keys().collect();
        eprintln!("{} {}({})", "->".cyan(), call.name.bold(), args.join(", "));
    }

    fn on_tool_result(&self, call: &ToolUse, result: &ToolResult) {
        if result.is_error {
            eprintln!(
                "  {} {}: {}",
                "x".red(),
                call.name,
                Self::preview(&result.content)
            );
        } else {
            eprintln!(
                "  {} {}: {}",
                "v".green(),
                call.name,
                Self::preview(&result.content).dimmed()
            );
        }
    }

    fn on_turn_end(&self, outcome: &TurnOutcome) {
        if !outcome.is_completed() {
            eprintln!("{} turn stopped at a limit", "!".yellow());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_truncates() {
        assert_eq!(ConsoleProgress::preview("short"), "short");
        assert_eq!(ConsoleProgress::preview("one\ntwo"), "one...");
        let long = "x".repeat(200);
        assert_eq!(ConsoleProgress::preview(&long), format!("{}...", "x".repeat(120)));
    }
}
