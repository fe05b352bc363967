use std::fs::File;
use std::sync::Arc;

use clap::Parser;
use mirage::core::config::{self, CliOverrides};
use mirage::core::session::TerminalSession;
use mirage::inference::LlmHoneypot;
use mirage::shell;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use tokio::io::BufReader;

#[derive(Parser)]
#[command(name = "mirage", about = "LLM-backed terminal emulation for honeypots")]
struct Args {
    /// Backend to use: llama3, gpt4-o or groq
    #[arg(short, long)]
    model: Option<String>,

    /// Emulated protocol (only ssh has a prompt today)
    #[arg(long)]
    protocol: Option<String>,

    /// Override the backend's completions endpoint
    #[arg(long)]
    host: Option<String>,

    /// Custom persona replacing the default terminal instructions
    #[arg(long)]
    persona: Option<String>,

    /// Hostname shown in the shell prompt
    #[arg(long, default_value = "ubuntu")]
    hostname: String,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to mirage.log in current directory
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create("mirage.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = config::load_config().unwrap_or_else(|e| {
        log::warn!("Ignoring config file: {}", e);
        config::MirageConfig::default()
    });
    let cli = CliOverrides {
        protocol: args.protocol,
        model: args.model,
        host: args.host,
        persona: args.persona,
    };
    let session_config = config::resolve(&file_config, &cli)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    let honeypot = LlmHoneypot::with_http(session_config).map_err(std::io::Error::other)?;
    match honeypot.backend() {
        Ok(backend) => log::info!(
            "Mirage starting up: protocol={}, backend={} ({})",
            honeypot.config().protocol,
            backend,
            backend.spec().name
        ),
        Err(e) => log::warn!("Mirage starting up without a usable backend: {}", e),
    }

    let mut session = TerminalSession::new(Arc::new(honeypot));
    let stdin = BufReader::new(tokio::io::stdin());
    shell::run(
        &mut session,
        stdin,
        tokio::io::stdout(),
        &shell::prompt_for(&args.hostname),
    )
    .await
}
