//! Interactive chat client for the Ableton AI Controller backend.
//!
//! # Usage
//!
//! ```bash
//! # Talk to the backend on 127.0.0.1:8000
//! ableton-chat
//!
//! # Talk to a backend elsewhere
//! ableton-chat --base-url http://studio.local:8000
//!
//! # Disable colors (useful for piping output)
//! ableton-chat --no-color
//! ```
//!
//! The base address can also come from `ABLETON_CHAT_BASE_URL`.  Errors are
//! logged to stderr; set `RUST_LOG` to change the level.
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/help` - Show available commands
//! - `/history` - Reload the conversation
//! - `/session` - Show session info
//! - `/mode [name]` - Show or change the mode
//! - `/quit` - Exit the application

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing_subscriber::EnvFilter;

use ableton_chat::chat::{BASE_URL_ENV, ChatArgs, ChatCommand, ChatConfig, help_text, parse_command};
use ableton_chat::{ChatClient, HttpBackend, PlainTextRenderer, Renderer, SendOutcome};

type Client = ChatClient<HttpBackend, PlainTextRenderer>;

/// Main entry point for the ableton-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let (args, _) = ChatArgs::from_command_line_relaxed("ableton-chat [OPTIONS]");
    let config = ChatConfig::resolve(args, std::env::var(BASE_URL_ENV).ok());

    let backend = HttpBackend::with_options(&config.base_url, config.timeout)?;
    let client = ChatClient::new(backend, PlainTextRenderer::with_color(config.use_color));
    let mut rl = DefaultEditor::new()?;

    println!("Ableton AI Controller chat ({})", config.base_url);
    println!("Type /help for commands, /quit to exit\n");

    client.initialize().await;

    loop {
        match rl.readline("> ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line.as_str());

                if let Some(cmd) = parse_command(&line) {
                    match cmd {
                        ChatCommand::SetMode(_) | ChatCommand::SaveProject(_) => {
                            if let Some(message) = cmd.backend_message() {
                                send(&client, message).await;
                            }
                        }
                        ChatCommand::Quit => {
                            println!("Goodbye!");
                            break;
                        }
                        ChatCommand::Help => {
                            client.with_renderer(|r| {
                                for line in help_text().lines() {
                                    r.print_info(&format!("    {}", line));
                                }
                            });
                        }
                        ChatCommand::History => client.fetch_conversation_history().await,
                        ChatCommand::Session => client.fetch_session_info().await,
                        ChatCommand::ShowMode => client.fetch_current_mode().await,
                        ChatCommand::SaveTranscript(path) => {
                            match client.save_transcript_to(&path) {
                                Ok(()) => client.with_renderer(|r| {
                                    r.print_info(&format!("Transcript saved to {}", path))
                                }),
                                Err(err) => client.with_renderer(|r| {
                                    r.print_error(&format!("Failed to save transcript: {}", err))
                                }),
                            }
                        }
                        ChatCommand::Invalid(message) => {
                            client.with_renderer(|r| r.print_error(&message));
                        }
                    }
                    continue;
                }

                send(&client, line).await;
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt - soft interrupt
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D - exit
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                client.with_renderer(|r| r.print_error(&format!("Input error: {}", err)));
                break;
            }
        }
    }

    Ok(())
}

/// Types `text` into the input field and sends it.
async fn send(client: &Client, text: String) {
    client.set_input(text);
    if let SendOutcome::Delivered { mode_refresh } = client.send_message().await {
        // Keep the mode line from landing on top of the next prompt.
        if let Err(err) = mode_refresh.await {
            tracing::warn!(error = %err, "mode refresh did not complete");
        }
    }
}
