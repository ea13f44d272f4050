//! Interactive terminal chat with the sales agent.
//!
//! # Usage
//!
//! ```bash
//! # Built-in persona and model
//! GEMINI_API_KEY=... salesbot-chat
//!
//! # Custom persona and model
//! salesbot-chat --profile ozenvita.yaml --model gemini-2.5-flash
//!
//! # Disable colors (useful for piping output)
//! salesbot-chat --no-color
//! ```
//!
//! Without an API key the chat still runs; every reply is the persona's
//! fallback message.
//!
//! # Commands
//!
//! - `/replies` - List the quick replies
//! - `/quick <n>` - Send quick reply n
//! - `/reset` - Start over
//! - `/prompt` - Show the agent's instruction
//! - `/stats` - Show session statistics
//! - `/quit` - Exit the application

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use time::UtcOffset;

use salesbot::Gemini;
use salesbot::chat::{
    ChatArgs, ChatCommand, ChatConfig, ChatView, PlainTextRenderer, Renderer, help_text,
    parse_command,
};

/// Main entry point for the salesbot-chat application.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // The local offset is only readable while the process is single-threaded.
    let utc_offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    tokio::runtime::Runtime::new()?.block_on(run(utc_offset))
}

async fn run(utc_offset: UtcOffset) -> Result<(), Box<dyn std::error::Error>> {

    let (args, _) = ChatArgs::from_command_line_relaxed("salesbot-chat [OPTIONS]");
    let config = ChatConfig::try_from(args)?;

    let client = Gemini::with_options(None, config.base_url.clone(), None)?;
    let mut view = ChatView::new(
        Arc::new(client),
        config.profile.clone(),
        config.model.clone(),
        config.timeout,
    )?;
    let mut renderer =
        PlainTextRenderer::with_color(config.profile.agent_name.clone(), config.use_color)
            .with_utc_offset(utc_offset);
    let mut rl = DefaultEditor::new()?;

    // Ctrl+C while a reply is pending must not kill the chat mid-turn.
    let interrupted = Arc::new(AtomicBool::new(false));
    let interrupted_clone = interrupted.clone();
    ctrlc::set_handler(move || {
        interrupted_clone.store(true, Ordering::Relaxed);
    })?;

    println!(
        "{} | {} (model: {})",
        config.profile.agent_name,
        config.profile.product,
        view.model()
    );
    println!("Type /help for commands, /quit to exit\n");

    view.start(&mut renderer).await?;
    print_quick_replies(&view);

    loop {
        if interrupted.swap(false, Ordering::Relaxed) {
            renderer.print_info("(interrupt ignored while waiting; use /quit or Ctrl+D to exit)");
        }

        let readline = rl.readline("> ");

        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                if let Some(cmd) = parse_command(line) {
                    match cmd {
                        ChatCommand::Quit => {
                            println!("Goodbye!");
                            break;
                        }
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {}", line);
                            }
                        }
                        ChatCommand::Replies => print_quick_replies(&view),
                        ChatCommand::Quick(index) => {
                            if let Err(err) = view.quick_reply(index, &mut renderer).await {
                                renderer.print_error(&err.to_string());
                            }
                        }
                        ChatCommand::Reset => {
                            renderer.print_info("Starting over.");
                            if let Err(err) = view.reset(&mut renderer).await {
                                renderer.print_error(&err.to_string());
                            }
                        }
                        ChatCommand::Prompt => match view.system_prompt() {
                            Some(prompt) => {
                                for line in prompt.lines() {
                                    println!("    {}", line);
                                }
                            }
                            None => renderer.print_info("Session is not initialized."),
                        },
                        ChatCommand::Stats => print_stats(&view),
                        ChatCommand::ShowConfig => print_config(&view),
                        ChatCommand::Invalid(message) => {
                            renderer.print_error(&message);
                        }
                    }
                    continue;
                }

                if let Err(err) = view.submit(line, &mut renderer).await {
                    renderer.print_error(&err.to_string());
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt - soft interrupt
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    Ok(())
}

fn print_quick_replies(view: &ChatView) {
    let replies = &view.profile().quick_replies;
    if replies.is_empty() {
        return;
    }
    println!("    Quick replies (/quick <n>):");
    for (i, reply) in replies.iter().enumerate() {
        println!("      {}. {}", i + 1, reply);
    }
}

fn print_stats(view: &ChatView) {
    let stats = view.session_stats();
    println!("    Session Statistics:");
    println!("      Model: {}", view.model());
    println!("      Messages: {}", view.transcript().len());
    println!("      Turns sent: {}", stats.turns);
    println!("      Turns recorded: {}", stats.recorded_turns);
    println!("      Fallback replies: {}", stats.fallbacks);
    println!("      Timeouts: {}", stats.timeouts);
    println!("      Total tokens: {}", stats.total_tokens);
}

fn print_config(view: &ChatView) {
    let profile = view.profile();
    println!("    Current Configuration:");
    println!("      Model: {}", view.model());
    println!("      Agent: {}", profile.agent_name);
    println!("      Product: {}", profile.product);
    println!("      Checkout: {}", profile.checkout_url);
    println!("      Temperature: {:.2}", profile.temperature);
    println!("      Top-p: {:.2}", profile.top_p);
    match view.timeout() {
        Some(timeout) => println!("      Timeout: {}s", timeout.as_secs()),
        None => println!("      Timeout: (none)"),
    }
}
