//! # Core Application Logic
//!
//! Everything around the dispatcher that a honeypot deployment needs but
//! the dispatcher itself does not: where settings come from, and who owns
//! a session's history.
//!
//! ```text
//!     config.toml + env + CLI
//!               │
//!               ▼
//!        ┌────────────┐        ┌──────────────────┐
//!        │  config    │───────▶│   LlmHoneypot    │  (inference)
//!        └────────────┘        └────────▲─────────┘
//!                                       │ execute_model(history, command)
//!                              ┌────────┴─────────┐
//!                              │ TerminalSession  │  one per attacker
//!                              └──────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`config`]: layered settings resolved into a `HoneypotSessionConfig`
//! - [`session`]: the `TerminalSession` that owns and grows history

pub mod config;
pub mod session;
