//! Slash command parsing for the chat application.
//!
//! This module handles parsing of special commands that start with `/`,
//! allowing users to control the chat without sending text to the agent.

/// A parsed chat command.
///
/// These commands control the chat and are not sent to the agent.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// List the predefined quick replies.
    Replies,

    /// Send the quick reply with this zero-based index.
    Quick(usize),

    /// Throw the conversation away and start over.
    Reset,

    /// Show the instruction the agent is running with.
    Prompt,

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Display session statistics.
    Stats,

    /// Show the current configuration.
    ShowConfig,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a command, or `None` if it
/// should be sent to the agent.
///
/// # Examples
///
/// ```
/// # use salesbot::chat::{ChatCommand, parse_command};
/// assert_eq!(parse_command("/quit"), Some(ChatCommand::Quit));
/// assert_eq!(parse_command("/quick 2"), Some(ChatCommand::Quick(1)));
/// assert!(parse_command("How much is it?").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();
    let rest = input.strip_prefix('/')?;

    let mut parts = rest.splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "replies" => ChatCommand::Replies,
        "quick" | "qr" => match argument {
            Some(arg) => match arg.parse::<usize>() {
                Ok(n) if n >= 1 => ChatCommand::Quick(n - 1),
                _ => ChatCommand::Invalid("/quick expects a number starting at 1".to_string()),
            },
            None => ChatCommand::Invalid("/quick requires a number (see /replies)".to_string()),
        },
        "reset" | "restart" => ChatCommand::Reset,
        "prompt" => ChatCommand::Prompt,
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        "stats" | "status" => ChatCommand::Stats,
        "config" => ChatCommand::ShowConfig,
        _ => ChatCommand::Invalid(format!("Unknown command: /{}", command)),
    };

    Some(result)
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /replies               List the quick replies
  /quick <n>             Send quick reply number n
  /reset                 Start the conversation over
  /prompt                Show the agent's instruction
  /stats                 Show session statistics
  /config                Show current configuration
  /help                  Show this help message
  /quit                  Exit the chat"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_quit_commands() {
        assert_eq!(parse_command("/quit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/exit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/q"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("  /quit  "), Some(ChatCommand::Quit));
    }

    #[test]
    fn parse_quick() {
        assert_eq!(parse_command("/quick 1"), Some(ChatCommand::Quick(0)));
        assert_eq!(parse_command("/QR   3 "), Some(ChatCommand::Quick(2)));
        assert!(matches!(
            parse_command("/quick 0"),
            Some(ChatCommand::Invalid(msg)) if msg.contains("starting at 1")
        ));
        assert!(matches!(
            parse_command("/quick two"),
            Some(ChatCommand::Invalid(_))
        ));
        assert!(matches!(
            parse_command("/quick"),
            Some(ChatCommand::Invalid(msg)) if msg.contains("requires")
        ));
    }

    #[test]
    fn parse_session_commands() {
        assert_eq!(parse_command("/replies"), Some(ChatCommand::Replies));
        assert_eq!(parse_command("/reset"), Some(ChatCommand::Reset));
        assert_eq!(parse_command("/prompt"), Some(ChatCommand::Prompt));
        assert_eq!(parse_command("/stats"), Some(ChatCommand::Stats));
        assert_eq!(parse_command("/config"), Some(ChatCommand::ShowConfig));
        assert_eq!(parse_command("/?"), Some(ChatCommand::Help));
    }

    #[test]
    fn unknown_command() {
        assert_eq!(
            parse_command("/model gemini-2.5-pro"),
            Some(ChatCommand::Invalid("Unknown command: /model".to_string()))
        );
    }

    #[test]
    fn non_commands() {
        assert_eq!(parse_command("Hello there!"), None);
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("  "), None);
        assert_eq!(parse_command("50% off / today"), None);
    }

    #[test]
    fn help_text_lists_commands() {
        let help = help_text();
        assert!(help.contains("/quit"));
        assert!(help.contains("/quick"));
        assert!(help.contains("/reset"));
    }
}
