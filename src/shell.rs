//! # Emulated Shell
//!
//! Line-oriented front end: print a prompt, read a command, hand it to the
//! session, print whatever the model answered. Generic over the reader and
//! writer so it can sit on stdin/stdout or on an accepted connection.

use log::{info, warn};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::core::session::TerminalSession;

const EXIT_COMMANDS: [&str; 2] = ["exit", "logout"];

/// Prompt shown before each command, e.g. `user@ubuntu:~$ `.
pub fn prompt_for(hostname: &str) -> String {
    format!("user@{hostname}:~$ ")
}

/// What the attacker sees when the backend could not produce output.
fn failure_line(command: &str) -> String {
    let program = command.split_whitespace().next().unwrap_or(command);
    format!("-bash: {program}: command not found\n")
}

/// Runs the read-eval-print loop until EOF or an exit command.
pub async fn run<R, W>(
    session: &mut TerminalSession,
    mut reader: R,
    mut writer: W,
    prompt: &str,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut line = String::new();
    loop {
        writer.write_all(prompt.as_bytes()).await?;
        writer.flush().await?;

        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            info!("Session {} closed by EOF after {} turns", session.id(), session.turns());
            break;
        }

        let command = line.trim_end_matches(['\r', '\n']);
        if command.trim().is_empty() {
            continue;
        }
        if EXIT_COMMANDS.contains(&command.trim()) {
            writer.write_all(b"logout\n").await?;
            info!("Session {} logged out after {} turns", session.id(), session.turns());
            break;
        }

        match session.run_command(command).await {
            Ok(output) => {
                writer.write_all(output.as_bytes()).await?;
                if !output.is_empty() && !output.ends_with('\n') {
                    writer.write_all(b"\n").await?;
                }
            }
            Err(e) => {
                warn!("Session {}: {:?} failed: {}", session.id(), command, e);
                writer.write_all(failure_line(command).as_bytes()).await?;
            }
        }
    }
    writer.flush().await
}
