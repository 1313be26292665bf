//! Context management: list, select, delete, and token display.
//!
//! Contexts live in the TOML config; their access tokens live in the
//! system keyring under the context name.

use std::io::Write;

use secrecy::ExposeSecret;
use serde::Serialize;
use tabled::Tabled;

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct ContextListing {
    name: String,
    current: bool,
    address: String,
    port: u16,
    fingerprint: String,
}

#[derive(Tabled)]
struct ContextRow {
    #[tabled(rename = " ")]
    marker: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Port")]
    port: u16,
    #[tabled(rename = "TLS Fingerprint")]
    fingerprint: String,
}

impl From<&ContextListing> for ContextRow {
    fn from(c: &ContextListing) -> Self {
        Self {
            marker: if c.current { "*" } else { "" }.into(),
            name: c.name.clone(),
            address: c.address.clone(),
            port: c.port,
            fingerprint: c.fingerprint.clone(),
        }
    }
}

pub fn list(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load_config_or_default();

    let listings: Vec<ContextListing> = cfg
        .contexts
        .iter()
        .map(|(name, entry)| ContextListing {
            name: name.clone(),
            current: cfg.current_context.as_deref() == Some(name),
            address: entry.address.clone(),
            port: entry.port,
            fingerprint: entry.fingerprint.clone(),
        })
        .collect();

    if listings.is_empty() && !global.quiet {
        eprintln!("no contexts defined -- create one with: hemma authorize <ip>");
    }

    let rendered = output::render_list(&global.output, &listings, |c| ContextRow::from(c), |c| {
        c.name.clone()
    });
    output::print_output(&rendered, global.quiet);
    Ok(())
}

pub fn use_context(name: &str) -> Result<(), CliError> {
    let mut cfg = config::load_config_or_default();

    if !cfg.contexts.contains_key(name) {
        return Err(CliError::UnknownContext {
            name: name.to_owned(),
            available: cfg.contexts.keys().cloned().collect::<Vec<_>>().join(", "),
        });
    }

    cfg.current_context = Some(name.to_owned());
    config::save_config(&cfg)?;
    println!("Current context is now '{name}'");
    Ok(())
}

pub fn delete(name: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let mut cfg = config::load_config_or_default();

    if cfg.contexts.remove(name).is_none() {
        return Err(CliError::UnknownContext {
            name: name.to_owned(),
            available: cfg.contexts.keys().cloned().collect::<Vec<_>>().join(", "),
        });
    }
    if cfg.current_context.as_deref() == Some(name) {
        cfg.current_context = None;
    }
    config::save_config(&cfg)?;
    config::delete_token(name);

    if !global.quiet {
        println!("Deleted context '{name}'");
    }
    Ok(())
}

/// Print the raw access token, suitable for `$(hemma show token)`.
pub fn show_token(global: &GlobalOpts) -> Result<(), CliError> {
    let ctx = config::resolve_context(global)?;
    print!("{}", ctx.credential.access_token().expose_secret());
    let _ = std::io::stdout().flush();
    Ok(())
}
