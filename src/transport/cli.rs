//! CLI transport for direct terminal interaction

use crate::config::Config;
use crate::tools::ToolRegistry;
use crate::widget::{
    render_banner, render_turn, BannerKind, ChatWidget, HttpChatClient, Sender, SendOutcome,
    EXAMPLES, LOADING_TEXT,
};
use anyhow::Result;
use colored::Colorize;
use std::io::{self, BufRead, Write};

/// A line typed into the terminal client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/example N`, 1-based
    Example(usize),
    /// `/key <k>`; `None` clears the key
    Key(Option<String>),
    Quit,
    Help,
    Send(String),
}

impl Command {
    pub fn parse(line: &str) -> std::result::Result<Self, String> {
        let trimmed = line.trim();
        let (head, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (trimmed, ""),
        };

        match head {
            "/quit" | "/exit" => Ok(Command::Quit),
            "/help" => Ok(Command::Help),
            "/key" => Ok(Command::Key((!rest.is_empty()).then(|| rest.to_string()))),
            "/example" => rest
                .parse::<usize>()
                .ok()
                .filter(|n| (1..=EXAMPLES.len()).contains(n))
                .map(Command::Example)
                .ok_or_else(|| format!("Usage: /example <1-{}>", EXAMPLES.len())),
            _ => Ok(Command::Send(line.to_string())),
        }
    }
}

fn print_help() {
    println!("Commands:");
    println!("  /example N   fill the message with example N");
    println!("  /key <key>   set the OpenAI API key (empty clears it)");
    println!("  /quit        exit");
    println!("Examples:");
    for (i, example) in EXAMPLES.iter().enumerate() {
        println!("  {}. {}", i + 1, example.dimmed());
    }
    println!();
}

/// Run the interactive terminal chat client against a running server
pub async fn run_chat(config: &Config, url: Option<String>, api_key: Option<String>) -> Result<()> {
    let url = url.unwrap_or_else(|| config.widget.server_url.clone());
    let client = HttpChatClient::new(&url)?;
    let widget = ChatWidget::new(client, config.widget.status_timeout());

    if let Some(key) = api_key {
        widget.set_api_key(key);
    }

    println!("{}", "=== toolchat ===".bold().cyan());
    println!("Server: {}", url);
    widget.check_health().await;
    if let Some(banner) = widget.banner() {
        let line = render_banner(&banner);
        match banner.kind {
            BannerKind::Error => println!("{}", line.red()),
            _ => println!("{}", line.green()),
        }
    }
    println!("Type /help for commands\n");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut shown = widget.turns().len();

    loop {
        let pending = widget.message();
        if pending.is_empty() {
            print!("> ");
        } else {
            print!("> {} ", pending.dimmed());
        }
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim_end_matches(['\r', '\n']);

        match Command::parse(input) {
            Ok(Command::Quit) => {
                println!("Goodbye!");
                break;
            }
            Ok(Command::Help) => print_help(),
            Ok(Command::Key(key)) => {
                let cleared = key.is_none();
                widget.set_api_key(key.unwrap_or_default());
                println!("{}\n", if cleared { "API key cleared." } else { "API key set." });
            }
            Ok(Command::Example(n)) => {
                widget.use_example(n - 1);
            }
            Ok(Command::Send(line)) => {
                // An empty line sends whatever an example put in the field
                if !line.trim().is_empty() {
                    widget.set_message(line);
                }
                if widget.message().trim().is_empty() {
                    continue;
                }

                println!("{}", LOADING_TEXT.dimmed());
                let outcome = widget.send_message().await;

                let turns = widget.turns();
                for turn in turns.iter().skip(shown) {
                    if turn.sender == Sender::Agent {
                        println!("\n{}\n", render_turn(turn));
                    }
                }
                shown = turns.len();

                if let SendOutcome::Failed(_) = outcome {
                    if let Some(banner) = widget.banner() {
                        eprintln!("{}\n", render_banner(&banner).red());
                    }
                }
            }
            Err(usage) => eprintln!("{}\n", usage.yellow()),
        }
    }

    Ok(())
}

/// Print the tools the agent can call
pub fn run_tools(config: &Config) {
    let registry = ToolRegistry::with_defaults(&config.tools);
    println!("{}", "=== Available tools ===".bold().cyan());
    for info in registry.infos() {
        println!("  {:<14} {}", info.name.green(), info.description);
    }
}
