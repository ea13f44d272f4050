//! Chat application module for talking to the sales agent.
//!
//! This module provides the interactive chat built on top of the
//! conversation session. It supports:
//!
//! - An ordered, append-only transcript of user and agent messages
//! - A typing indicator while a reply is pending
//! - Predefined quick replies and slash commands
//! - Configurable model, persona and timeout
//!
//! # Architecture
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`view`]: the view model that owns the transcript and drives the session
//! - [`transcript`]: messages and their ordering
//! - [`render`]: terminal output
//! - [`commands`]: slash command parsing

mod commands;
mod config;
mod render;
mod transcript;
mod view;

pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig};
pub use render::{PlainTextRenderer, Renderer, sanitize};
pub use transcript::{Message, MessageId, Sender, Transcript};
pub use view::ChatView;
