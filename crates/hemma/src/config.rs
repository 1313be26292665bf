//! CLI-owned configuration: TOML contexts, keyring-backed tokens, and
//! credential resolution.
//!
//! A context names one hub: address, port, and the pinned certificate
//! fingerprint. Access tokens never touch the config file -- they live
//! in the system keyring under the context's name.

use std::collections::BTreeMap;
use std::path::PathBuf;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use hemma_api::Credential;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Keyring service name; the account is the context name.
const KEYRING_SERVICE: &str = "hemma";

// ── TOML config structs ──────────────────────────────────────────────

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Context used when --context is not specified.
    pub current_context: Option<String>,

    /// Named hub contexts.
    #[serde(default)]
    pub contexts: BTreeMap<String, ContextEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContextEntry {
    /// Hub IP address or host name.
    pub address: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Pinned certificate fingerprint (lowercase hex SHA-256).
    #[serde(default)]
    pub fingerprint: String,
}

fn default_port() -> u16 {
    8443
}

// ── Config file path ─────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("dev", "hemma", "hemma")
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .unwrap_or_else(|| {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("hemma");
            p.push("config.toml");
            p
        })
}

// ── Config loading / saving ──────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, CliError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(config_path()))
        .merge(Env::prefixed("HEMMA_CFG_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

/// Persist the config, creating the directory on first save.
pub fn save_config(config: &Config) -> Result<(), CliError> {
    let path = config_path();
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let rendered = toml::to_string_pretty(config).map_err(|e| CliError::Internal {
        message: format!("could not serialize config: {e}"),
    })?;
    std::fs::write(&path, rendered)?;
    Ok(())
}

// ── Token storage ────────────────────────────────────────────────────

pub fn store_token(context: &str, token: &SecretString) -> Result<(), CliError> {
    keyring::Entry::new(KEYRING_SERVICE, context)?.set_password(token.expose_secret())?;
    Ok(())
}

pub fn load_token(context: &str) -> Option<SecretString> {
    keyring::Entry::new(KEYRING_SERVICE, context)
        .and_then(|entry| entry.get_password())
        .ok()
        .filter(|t| !t.is_empty())
        .map(SecretString::from)
}

/// Remove a context's token; a missing entry is not an error.
pub fn delete_token(context: &str) {
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, context) {
        let _ = entry.delete_credential();
    }
}

// ── Context resolution ───────────────────────────────────────────────

/// A fully resolved context: config entry plus the credential rebuilt
/// from the keyring token and the persisted fingerprint.
pub struct ResolvedContext {
    pub name: String,
    pub entry: ContextEntry,
    pub credential: Credential,
}

/// Resolve the active context from the --context flag and the config.
///
/// This is the single boundary where CLI config types cross into
/// `hemma-api` types.
pub fn resolve_context(global: &GlobalOpts) -> Result<ResolvedContext, CliError> {
    let config = load_config_or_default();

    let name = global
        .context
        .clone()
        .or_else(|| config.current_context.clone())
        .ok_or_else(|| CliError::NoContext {
            path: config_path().display().to_string(),
        })?;

    let entry = config
        .contexts
        .get(&name)
        .cloned()
        .ok_or_else(|| CliError::UnknownContext {
            available: config
                .contexts
                .keys()
                .cloned()
                .collect::<Vec<_>>()
                .join(", "),
            name: name.clone(),
        })?;

    let token = load_token(&name).ok_or_else(|| CliError::NoToken {
        context: name.clone(),
    })?;

    let credential = Credential::new(token.expose_secret(), &entry.fingerprint);

    Ok(ResolvedContext {
        name,
        entry,
        credential,
    })
}

// ── Tests ────────────────────────────────────────────────────────────
