mod config;
mod error;

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use completion::{CompletionClient, CredentialStatus, Transport};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::{API_KEY_ENV, Config};
use error::Result;

const CONFIG_FILE: &str = "gptchat.toml";

#[derive(Parser)]
#[command(name = "gptchat")]
#[command(about = "Send single-turn prompts to a chat completion endpoint", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a config file (defaults to ./gptchat.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Model identifier to request
    #[arg(long, global = true)]
    model: Option<String>,

    /// Maximum tokens in each reply
    #[arg(long, global = true)]
    max_tokens: Option<u32>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat
    Chat,
    /// Report whether the API key is usable
    Check,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
}

async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    // A missing .env is fine; the key may come from the shell or the config file.
    dotenvy::dotenv().ok();

    let config = load_config(cli.config.as_deref())?;
    let client = build_client(&cli, &config);

    let status = client.check_credential();
    if status.is_valid() {
        info!("{status}");
    } else {
        warn!("{status}");
    }

    match cli.command {
        Some(Commands::Chat) | None => {
            cmd_chat(&client).await?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Check) => {
            if cmd_check(client.check_credential(), &mut io::stdout())? {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Ok(Config::load(path)?),
        None if Path::new(CONFIG_FILE).exists() => Ok(Config::load(CONFIG_FILE)?),
        None => Ok(Config::default()),
    }
}

fn build_client(cli: &Cli, config: &Config) -> CompletionClient {
    let credential = config.credential(std::env::var(API_KEY_ENV).ok());

    CompletionClient::builder(credential)
        .endpoint(&config.client.endpoint)
        .model(cli.model.as_deref().unwrap_or(&config.client.model))
        .max_tokens(cli.max_tokens.unwrap_or(config.client.max_tokens))
        .build()
}

/// Print the credential status line and report whether the key is usable.
fn cmd_check<W: Write>(status: CredentialStatus, out: &mut W) -> Result<bool> {
    writeln!(out, "{}", status_line(status))?;
    Ok(status.is_valid())
}

fn status_line(status: CredentialStatus) -> String {
    if status.is_valid() {
        format!("✓ {status}")
    } else {
        format!("⚠ {status}")
    }
}

async fn cmd_chat(client: &CompletionClient) -> Result<()> {
    println!("gptchat v{}", env!("CARGO_PKG_VERSION"));
    println!("Model: {}", client.model());

    println!("{}", status_line(client.check_credential()));
    println!("Type 'quit' or Ctrl+D to exit.\n");

    let stdin = io::stdin();
    chat_loop(client, stdin.lock(), &mut io::stdout(), &mut io::stderr()).await?;

    println!("\nBye.");
    Ok(())
}

/// Read lines from `input` and answer each one with a fresh request.
///
/// Each call is awaited before the next prompt, so at most one request is in
/// flight. Failures are reported on `err` and the loop continues.
async fn chat_loop<T, R, W, E>(
    client: &CompletionClient<T>,
    mut input: R,
    out: &mut W,
    err: &mut E,
) -> Result<()>
where
    T: Transport,
    R: BufRead,
    W: Write,
    E: Write,
{
    loop {
        write!(out, "> ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            // EOF
            break;
        }

        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if text == "quit" || text == "exit" {
            break;
        }

        match client.complete(text).await {
            Ok(reply) => writeln!(out, "\n{reply}\n")?,
            Err(e) => writeln!(err, "Error: {e}\n")?,
        }
    }

    Ok(())
}
