//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.mirage/config.toml`. If missing on first run, a
//! commented-out default is generated so operators can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::inference::{Backend, DEFAULT_TIMEOUT, HoneypotSessionConfig, Protocol};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct MirageConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub backend: BackendConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub protocol: Option<Protocol>,
    pub model: Option<String>,
    pub persona: Option<String>,
    pub persona_file: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct BackendConfig {
    pub api_key: Option<String>,
    pub host: Option<String>,
    pub model_name: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Values given on the command line. `None` = not specified.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub protocol: Option<String>,
    pub model: Option<String>,
    pub host: Option<String>,
    pub persona: Option<String>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    /// A value from env or CLI could not be interpreted.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
            ConfigError::Invalid(msg) => write!(f, "invalid config value: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns `~/.mirage/`.
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".mirage"))
}

/// Returns the path to `~/.mirage/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load config from `~/.mirage/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `MirageConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<MirageConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(MirageConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(MirageConfig::default());
    }

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    let config = parse_config(&contents)?;
    info!("Loaded config from {}", path.display());
    Ok(config)
}

pub fn parse_config(contents: &str) -> Result<MirageConfig, ConfigError> {
    let config: MirageConfig = toml::from_str(contents).map_err(ConfigError::Parse)?;
    debug!("Config: {:?}", redacted(&config));
    Ok(config)
}

/// Debug view with the API key masked, safe for the log file.
fn redacted(config: &MirageConfig) -> String {
    format!(
        "general={:?}, backend.host={:?}, backend.model_name={:?}, backend.timeout_secs={:?}, backend.api_key={}",
        config.general,
        config.backend.host,
        config.backend.model_name,
        config.backend.timeout_secs,
        if config.backend.api_key.is_some() { "<set>" } else { "<unset>" }
    )
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# Mirage Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# protocol = "ssh"                  # only "ssh" has a prompt today
# model = "llama3"                  # "llama3" (local Ollama), "gpt4-o", or "groq"
# persona = "You are a BusyBox shell on a home router."
# persona_file = "persona.md"       # Path relative to ~/.mirage/

# [backend]
# api_key = "sk-..."                # Or MIRAGE_API_KEY / OPENAI_API_KEY / GROQ_API_KEY
# host = "http://localhost:11434/api/chat"
# model_name = "llama3"             # Model field sent to the backend
# timeout_secs = 60
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(
    config: &MirageConfig,
    cli: &CliOverrides,
) -> Result<HoneypotSessionConfig, ConfigError> {
    resolve_with_env(config, cli, config_dir().as_deref(), |key| {
        std::env::var(key).ok()
    })
}

/// Same as [`resolve`], with environment lookup and the persona directory
/// supplied by the caller.
pub fn resolve_with_env(
    config: &MirageConfig,
    cli: &CliOverrides,
    persona_dir: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<HoneypotSessionConfig, ConfigError> {
    // Protocol: CLI → env → config → default
    let protocol = match cli.protocol.clone().or_else(|| env("MIRAGE_PROTOCOL")) {
        Some(raw) => raw
            .parse::<Protocol>()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?,
        None => config.general.protocol.unwrap_or_default(),
    };

    // Model: CLI → env → config → default. Left unvalidated here; an unknown
    // identifier is reported by the dispatcher as NoModelSelected.
    let model = cli
        .model
        .clone()
        .or_else(|| env("MIRAGE_MODEL"))
        .or_else(|| config.general.model.clone())
        .unwrap_or_else(|| Backend::Llama3.identifier().to_string());

    // API key: MIRAGE_API_KEY → backend's conventional variable → config
    let backend_env_key = model.parse::<Backend>().ok().and_then(|b| b.spec().env_key);
    let api_key = env("MIRAGE_API_KEY")
        .or_else(|| backend_env_key.and_then(&env))
        .or_else(|| config.backend.api_key.clone());

    // Endpoint: CLI → env → config → backend default (applied at dispatch)
    let host = cli
        .host
        .clone()
        .or_else(|| env("MIRAGE_HOST"))
        .or_else(|| config.backend.host.clone());

    let model_name = env("MIRAGE_MODEL_NAME").or_else(|| config.backend.model_name.clone());

    let custom_persona = cli
        .persona
        .clone()
        .or_else(|| resolve_persona(config, persona_dir));

    // 0 would expire every call immediately; treat it as unset.
    let timeout = config
        .backend
        .timeout_secs
        .filter(|&secs| secs > 0)
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_TIMEOUT);

    Ok(HoneypotSessionConfig {
        protocol,
        custom_persona,
        model,
        api_key,
        host,
        model_name,
        timeout,
    })
}

/// Resolves the custom persona: inline wins over file. `None` means the
/// built-in persona for the protocol is used.
fn resolve_persona(config: &MirageConfig, persona_dir: Option<&Path>) -> Option<String> {
    if let Some(ref persona) = config.general.persona {
        return Some(persona.clone());
    }

    let file = config.general.persona_file.as_ref()?;
    let persona_path = persona_dir?.join(file);
    match fs::read_to_string(&persona_path) {
        Ok(contents) => {
            let trimmed = contents.trim().to_string();
            if !trimmed.is_empty() {
                info!("Loaded persona from {}", persona_path.display());
                return Some(trimmed);
            }
            warn!("Persona file is empty: {}", persona_path.display());
        }
        Err(e) => {
            warn!(
                "Failed to read persona file {}: {}",
                persona_path.display(),
                e
            );
        }
    }
    None
}
