use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use opsflow_components::ComponentRegistry;
use opsflow_console::{Console, ConsoleConfig, Message, Submission};
use opsflow_credentials::CredentialName;
use serde_json::{Value, json};
use strum::IntoEnumIterator;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "opsflow")]
#[command(about = "Universal admin console for GitHub, Stripe, Supabase, Linear and Resend")]
struct Cli {
    /// Path to config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive conversation with the canvas printed after each answer
    Chat,
    /// List the tool catalog
    Tools {
        /// Print the catalog as JSON, with schemas
        #[arg(long)]
        json: bool,
    },
    /// List the component catalog
    Components {
        /// Print the catalog as JSON, with prop schemas
        #[arg(long)]
        json: bool,
    },
    /// Call one tool and print its outcome
    Call {
        tool: String,
        /// Tool input as a JSON object
        #[arg(long)]
        input: Option<String>,
    },
    /// Manage stored credentials
    Credentials {
        #[command(subcommand)]
        action: CredentialsAction,
    },
}

#[derive(Subcommand)]
enum CredentialsAction {
    /// Show which credentials are configured
    List,
    /// Store a credential; an empty value removes it
    Set { name: String, value: String },
    /// Remove a credential
    Clear { name: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(ConsoleConfig::default_path);
    let config = ConsoleConfig::load(&config_path)
        .await
        .with_context(|| format!("failed to load {}", config_path.display()))?;
    let mut console = Console::open(config).await?;

    match cli.command {
        Command::Chat => chat(&mut console).await,
        Command::Tools { json } => {
            let catalog = console.tool_catalog();
            if json {
                println!("{}", serde_json::to_string_pretty(&catalog)?);
            } else {
                for tool in catalog {
                    let marker = if tool.mutating { "*" } else { " " };
                    println!(
                        "{marker} {:<24} {:<9} {}",
                        tool.name,
                        tool.service.label(),
                        tool.description
                    );
                }
                println!("\n* changes remote state");
            }
            Ok(())
        }
        Command::Components { json } => {
            let catalog = console.component_catalog();
            if json {
                println!("{}", serde_json::to_string_pretty(&catalog)?);
            } else {
                for component in catalog {
                    println!("{:<16} {}", component.name, component.description);
                }
            }
            Ok(())
        }
        Command::Call { tool, input } => {
            let input: Value = match input {
                Some(raw) => serde_json::from_str(&raw).context("--input is not valid JSON")?,
                None => json!({}),
            };
            let outcome = console.call(&tool, input).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(())
        }
        Command::Credentials { action } => credentials(&mut console, action).await,
    }
}

async fn credentials(console: &mut Console, action: CredentialsAction) -> anyhow::Result<()> {
    match action {
        CredentialsAction::List => {
            for name in CredentialName::iter() {
                let status = match console.credentials().get(name) {
                    Some(value) if name.is_secret() => mask(value),
                    Some(value) => value.to_string(),
                    None => format!("not set ({})", name.placeholder()),
                };
                println!("{:<13} {:<21} {status}", name.as_str(), name.label());
            }
            if let Some(path) = console.credentials().path() {
                println!("\nStored in {}", path.display());
            }
        }
        CredentialsAction::Set { name, value } => {
            let name = CredentialName::parse(&name)?;
            console.set_credential(name, &value).await?;
            if value.trim().is_empty() {
                println!("Removed {}", name.label());
            } else {
                println!("Saved {}", name.label());
            }
        }
        CredentialsAction::Clear { name } => {
            let name = CredentialName::parse(&name)?;
            console.clear_credential(name).await?;
            println!("Removed {}", name.label());
        }
    }
    Ok(())
}

/// Hide a secret. Only values longer than eight characters keep their last
/// four visible.
fn mask(value: &str) -> String {
    let count = value.chars().count();
    let shown = if count > 8 { 4 } else { 0 };
    let tail: String = value.chars().skip(count - shown).collect();
    format!("{}{tail}", "•".repeat((count - shown).min(8)))
}

async fn chat(console: &mut Console) -> anyhow::Result<()> {
    println!("OpsFlow, Universal Admin Console");
    println!("Ask about users, payments, issues, or emails. Type `help` for the tool list,");
    println!("`canvas` to redraw every component, `quit` to leave.\n");
    for line in console.canvas()? {
        println!("{line}");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    loop {
        stdout.write_all(b"\n> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match line.trim() {
            "quit" | "exit" => break,
            "canvas" => {
                for line in console.canvas()? {
                    println!("{line}");
                }
                continue;
            }
            _ => {}
        }

        if let Submission::Answered(messages) = console.submit(&line).await {
            let width = console.config().canvas_width;
            for message in &messages {
                print_message(console.components(), message, width)?;
            }
        }
    }
    Ok(())
}

fn print_message(
    components: &ComponentRegistry,
    message: &Message,
    width: usize,
) -> anyhow::Result<()> {
    let text = message.content.text();
    if !text.is_empty() {
        println!("{text}");
    }
    if let Some(component) = &message.component {
        for line in components.render(component, width)? {
            println!("{line}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_mask_hides_short_secrets() {
        assert_eq!(mask("abcd"), "••••");
        assert_eq!(mask("sk_12345"), "••••••••");
        assert_eq!(mask("sk_test_51Nx9abcd"), "••••••••abcd");
    }
}
