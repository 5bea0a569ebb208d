use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use crossterm::style::Stylize;

use crate::agent::Agent;
use crate::config::Config;
use crate::llm::{ChatClient, SharedChatClient};
use crate::request::{Outcome, Supervisor};

#[derive(Debug, Clone)]
enum Command {
    Exit,
    Help,
    New,
    Context,
    Save,
    Load,
}

static CMD_NAMES: phf::Map<&'static str, Command> = phf::phf_map! {
    "exit" => Command::Exit,
    "quit" => Command::Exit,
    "q" => Command::Exit,
    "help" => Command::Help,
    "new" => Command::New,
    "context" => Command::Context,
    "save" => Command::Save,
    "load" => Command::Load,
};

impl Command {
    fn from_name(name: &str) -> Option<Command> {
        CMD_NAMES.get(name.to_ascii_lowercase().as_str()).cloned()
    }
}

/// Splits a slash-command body into its name and remaining argument.
fn split_command(body: &str) -> (&str, &str) {
    let mut parts = body.trim().splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or("");
    let arg = parts.next().unwrap_or("").trim();
    (name, arg)
}

/// Drives the interactive loop: reads a line, dispatches commands, and
/// runs chat turns through the request supervisor.
pub struct Repl {
    client: SharedChatClient,
    agent: Agent,
    supervisor: Supervisor,
    cancel_key_name: String,
    pipe: bool,
}

impl Repl {
    pub fn new(
        client: SharedChatClient,
        agent: Agent,
        supervisor: Supervisor,
        cancel_key_name: &str,
        pipe: bool,
    ) -> Self {
        Self {
            client,
            agent,
            supervisor,
            cancel_key_name: cancel_key_name.to_string(),
            pipe,
        }
    }

    pub async fn run(&mut self, config: &Config) -> Result<()> {
        self.print_banner(config);

        loop {
            let Some(line) = self.read_line()? else {
                break; // EOF
            };
            let line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }

            if let Some(body) = line.strip_prefix('/') {
                if self.handle_command(body)? {
                    break;
                }
                continue;
            }

            // The bare words work too, as a convenience.
            if matches!(line.to_ascii_lowercase().as_str(), "exit" | "quit") {
                break;
            }

            self.ask(&line).await;
        }

        self.print_system("Goodbye.");
        Ok(())
    }

    /// Returns true when the loop should exit.
    fn handle_command(&mut self, body: &str) -> Result<bool> {
        let (name, arg) = split_command(body);
        match Command::from_name(name) {
            Some(Command::Exit) => return Ok(true),
            Some(Command::Help) => {
                self.print_system(
                    "Commands: /help, /new, /context, /save <path>, /load <path>, /exit",
                );
            }
            Some(Command::New) => {
                self.agent.clear();
                self.print_system("New conversation started.");
            }
            Some(Command::Context) => self.print_context(),
            Some(Command::Save) => {
                if arg.is_empty() {
                    self.print_system("Usage: /save <path>");
                } else {
                    match self.agent.save(Path::new(arg)) {
                        Ok(()) => self.print_system(&format!("Conversation saved to {arg}")),
                        Err(err) => self.print_error(&format!("Save failed: {err:#}")),
                    }
                }
            }
            Some(Command::Load) => {
                if arg.is_empty() {
                    self.print_system("Usage: /load <path>");
                } else {
                    match self.agent.load(Path::new(arg)) {
                        Ok(()) => self.print_system(&format!("Conversation loaded from {arg}")),
                        Err(err) => self.print_error(&format!("Load failed: {err:#}")),
                    }
                }
            }
            None => self.print_system(&format!("Unknown command: /{body}")),
        }

        Ok(false)
    }

    /// One ask-cycle: append the user message provisionally, race the
    /// request against the cancel key, and reconcile the history with the
    /// outcome.
    async fn ask(&mut self, line: &str) {
        self.agent.push_user(line);
        let messages = self.agent.request_messages();
        let client = Arc::clone(&self.client);

        if !self.pipe {
            self.print_system(&format!(
                "Waiting for reply (press {} to cancel)...",
                self.cancel_key_name
            ));
        }

        let outcome = self
            .supervisor
            .run(async move { client.chat(&messages).await.map_err(anyhow::Error::from) })
            .await;

        match outcome {
            Outcome::Completed(reply) => {
                self.agent.push_assistant(&reply);
                self.print_reply(&reply);
            }
            Outcome::Cancelled => {
                self.agent.rollback_user();
                self.print_notice("[request cancelled]");
            }
            Outcome::Failed(err) => {
                // The unanswered user message stays in the history.
                self.print_error(&format!("Request failed: {err:#}"));
            }
        }
    }

    fn read_line(&self) -> Result<Option<String>> {
        if !self.pipe {
            print!("[{}]> ", self.agent.name());
            io::stdout().flush()?;
        }

        let mut buffer = String::new();
        let read = io::stdin()
            .read_line(&mut buffer)
            .context("failed to read stdin")?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(buffer))
    }

    fn print_banner(&self, config: &Config) {
        self.print_system(&format!(
            "parley — agent: {} (model: {}, config: {})",
            self.agent.name(),
            self.client.model_name(),
            config
                .config_path
                .clone()
                .map_or("N/A".to_string(), |p| p.display().to_string()),
        ));
    }

    fn print_context(&self) {
        let history = self.agent.history();
        if history.is_empty() {
            self.print_system("Conversation is empty.");
            return;
        }

        for (idx, msg) in history.iter().enumerate() {
            self.print_system(&format!("{:>2}. {}: {}", idx + 1, msg.role, msg.content));
        }
    }

    fn print_system(&self, message: &str) {
        for line in message.lines() {
            println!("* {}", line);
        }
    }

    fn print_reply(&self, message: &str) {
        println!("{}:", self.agent.name());
        if message.is_empty() {
            println!("  ");
            return;
        }
        for line in message.lines() {
            println!("  {}", line);
        }
    }

    fn print_notice(&self, message: &str) {
        if self.pipe {
            println!("* {}", message);
        } else {
            println!("* {}", message.dim());
        }
    }

    fn print_error(&self, message: &str) {
        if self.pipe {
            println!("* {}", message);
        } else {
            println!("* {}", message.red());
        }
    }
}
