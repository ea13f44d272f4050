//! Output rendering for the chat application.
//!
//! This module provides a trait-based rendering abstraction so the chat view
//! stays independent of the terminal. The default implementation prints
//! timestamped lines with optional ANSI styling.

use std::borrow::Cow;
use std::io::{self, Stdout, Write};

use time::UtcOffset;
use time::macros::format_description;

use crate::chat::transcript::{Message, Sender};

/// ANSI escape code for dim text (used for timestamps and the typing line).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code for bold text (used for sender names).
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for green text (used for the agent).
const ANSI_GREEN: &str = "\x1b[32m";

/// ANSI escape code for cyan text (used for the user).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// Carriage return plus "erase entire line".
const ANSI_CLEAR_LINE: &str = "\r\x1b[2K";

/// Trait for rendering chat output.
pub trait Renderer: Send {
    /// Show a transcript message.
    ///
    /// Message text is untrusted model output and must be shown as plain
    /// text.
    fn print_message(&mut self, message: &Message);

    /// Show that a reply is pending.
    fn print_typing(&mut self, label: &str);

    /// Remove the pending-reply indicator.
    fn clear_typing(&mut self);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);
}

/// Strip terminal control characters from untrusted text.
///
/// Newlines and tabs survive; escape sequences, carriage returns and other
/// C0/C1 controls are dropped so model output cannot restyle or rewrite the
/// terminal. Bidirectional embeddings, overrides and isolates are dropped
/// too, since they reorder how the surrounding text is displayed.
pub fn sanitize(text: &str) -> Cow<'_, str> {
    let is_unsafe =
        |c: char| (c.is_control() && c != '\n' && c != '\t') || is_bidi_control(c);
    if text.chars().any(is_unsafe) {
        Cow::Owned(text.chars().filter(|c| !is_unsafe(*c)).collect())
    } else {
        Cow::Borrowed(text)
    }
}

fn is_bidi_control(c: char) -> bool {
    matches!(
        c,
        '\u{061C}' | '\u{200E}' | '\u{200F}' | '\u{202A}'..='\u{202E}' | '\u{2066}'..='\u{2069}'
    )
}

/// Plain text renderer with optional ANSI styling.
pub struct PlainTextRenderer {
    stdout: Stdout,
    use_color: bool,
    agent_name: String,
    utc_offset: UtcOffset,
    typing: bool,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new(agent_name: impl Into<String>) -> Self {
        Self::with_color(agent_name, true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(agent_name: impl Into<String>, use_color: bool) -> Self {
        Self {
            stdout: io::stdout(),
            use_color,
            agent_name: sanitize(&agent_name.into()).into_owned(),
            utc_offset: UtcOffset::UTC,
            typing: false,
        }
    }

    /// Show timestamps at `offset` instead of UTC.
    pub fn with_utc_offset(mut self, offset: UtcOffset) -> Self {
        self.utc_offset = offset;
        self
    }

    /// Flushes stdout to ensure immediate display.
    fn flush(&mut self) {
        let _ = self.stdout.flush();
    }

    fn format_message(&self, message: &Message) -> String {
        let time = message
            .timestamp()
            .to_offset(self.utc_offset)
            .format(format_description!("[hour]:[minute]"))
            .unwrap_or_default();
        let (name, color) = match message.sender() {
            Sender::User => ("You", ANSI_CYAN),
            Sender::Agent => (self.agent_name.as_str(), ANSI_GREEN),
        };
        let text = sanitize(message.text());
        if self.use_color {
            format!("{ANSI_DIM}[{time}]{ANSI_RESET} {ANSI_BOLD}{color}{name}:{ANSI_RESET} {text}")
        } else {
            format!("[{time}] {name}: {text}")
        }
    }

    fn end_typing(&mut self) {
        if self.typing {
            if self.use_color {
                print!("{ANSI_CLEAR_LINE}");
            }
            self.typing = false;
        }
    }
}

impl Renderer for PlainTextRenderer {
    fn print_message(&mut self, message: &Message) {
        self.end_typing();
        println!("{}", self.format_message(message));
        self.flush();
    }

    fn print_typing(&mut self, label: &str) {
        self.typing = true;
        let label = sanitize(label);
        if self.use_color {
            print!("{ANSI_DIM}{label}{ANSI_RESET}");
        } else {
            println!("{label}");
        }
        self.flush();
    }

    fn clear_typing(&mut self) {
        self.end_typing();
        self.flush();
    }

    fn print_error(&mut self, error: &str) {
        self.end_typing();
        if self.use_color {
            eprintln!("{ANSI_RED}Error:{ANSI_RESET} {error}");
        } else {
            eprintln!("Error: {error}");
        }
    }

    fn print_info(&mut self, info: &str) {
        self.end_typing();
        println!("{info}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::transcript::Transcript;

    #[test]
    fn sanitize_keeps_plain_text() {
        assert!(matches!(sanitize("Olá!\n\tFrete grátis 🚚"), Cow::Borrowed(_)));
    }

    #[test]
    fn sanitize_strips_escape_sequences() {
        let hostile = "buy now\x1b[2J\x1b]0;pwned\x07\r\u{9b}31m";
        let clean = sanitize(hostile);
        assert!(!clean.contains('\x1b'));
        assert!(!clean.contains('\r'));
        assert!(!clean.contains('\u{9b}'));
        assert!(clean.starts_with("buy now"));
    }

    #[test]
    fn sanitize_strips_bidi_controls() {
        let spoofed = "pay \u{202E}lmth.exe\u{202C} now \u{2066}x\u{2069}\u{200F}";
        assert_eq!(sanitize(spoofed), "pay lmth.exe now x");
        assert!(matches!(sanitize("مرحبا hello"), Cow::Borrowed(_)));
    }

    #[test]
    fn timestamps_use_configured_offset() {
        let mut transcript = Transcript::new();
        let message = transcript.push(Sender::User, "hi").clone();
        let offset = UtcOffset::from_hms(-3, 0, 0).unwrap();
        let renderer = PlainTextRenderer::with_color("Closer", false).with_utc_offset(offset);
        let expected = message
            .timestamp()
            .to_offset(offset)
            .format(format_description!("[hour]:[minute]"))
            .unwrap();
        assert!(renderer.format_message(&message).starts_with(&format!("[{expected}] ")));
    }

    #[test]
    fn format_without_color_is_plain() {
        let mut transcript = Transcript::new();
        let message = transcript.push(Sender::Agent, "hello\x1b[31m").clone();
        let renderer = PlainTextRenderer::with_color("Closer", false);
        let line = renderer.format_message(&message);
        assert!(line.ends_with("] Closer: hello[31m"));
        assert!(!line.contains('\x1b'));

        let message = transcript.push(Sender::User, "hi").clone();
        assert!(renderer.format_message(&message).ends_with("] You: hi"));
    }

    #[test]
    fn renderer_color_setting() {
        assert!(PlainTextRenderer::new("a").use_color);
        assert!(!PlainTextRenderer::with_color("a", false).use_color);
    }
}
