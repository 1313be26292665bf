//! The authorization ceremony: register this client on a hub.
//!
//! Runs the button-press flow, then stores the result as a context --
//! address, port and pinned fingerprint in the config file, the access
//! token in the system keyring.

use std::io::Write;

use secrecy::ExposeSecret;

use hemma_api::{AuthProgress, Authorizer, Credential, HubClient};

use crate::cli::{AuthorizeArgs, GlobalOpts};
use crate::config::{self, ContextEntry};
use crate::error::CliError;

pub async fn handle(args: AuthorizeArgs, global: &GlobalOpts) -> Result<(), CliError> {
    if args.no_context && global.context.is_some() {
        return Err(CliError::Validation {
            field: "--no-context".into(),
            reason: "cannot be combined with --context".into(),
        });
    }

    let client_name = args.name.clone().unwrap_or_else(default_client_name);

    if !global.quiet {
        println!(
            "Registering user '{client_name}' on hub {}:{}",
            args.address, args.port
        );
    }

    let authorizer = Authorizer::new(&args.address, args.port, &client_name)
        .map_err(|e| CliError::from_api(e, &args.address))?;

    let quiet = global.quiet;
    let credential = authorizer
        .authorize(move |progress| {
            if quiet {
                return;
            }
            match progress {
                AuthProgress::AwaitingConfirmation => {
                    println!("Press the action button on the back of the hub within one minute");
                }
                AuthProgress::Polling => {
                    print!(".");
                    let _ = std::io::stdout().flush();
                }
            }
        })
        .await
        .map_err(|e| CliError::from_api(e, &args.address))?;

    if !global.quiet {
        println!();
        println!("Authorized");
    }

    let fingerprint = credential.fingerprint().unwrap_or_default();

    if args.no_context {
        println!("Access token:    {}", credential.access_token().expose_secret());
        println!("TLS fingerprint: {fingerprint}");
        return Ok(());
    }

    // The global --context flag doubles as the name for the new context.
    let name = match global.context {
        Some(ref name) => name.clone(),
        None => hub_custom_name(&args.address, args.port, &credential)
            .await
            .unwrap_or_else(|| args.address.clone()),
    };

    let mut cfg = config::load_config_or_default();
    cfg.contexts.insert(
        name.clone(),
        ContextEntry {
            address: args.address.clone(),
            port: args.port,
            fingerprint,
        },
    );
    if cfg.current_context.is_none() {
        cfg.current_context = Some(name.clone());
    }
    config::save_config(&cfg)?;
    config::store_token(&name, credential.access_token())?;

    if !global.quiet {
        println!("Created context '{name}' (token stored in the system keyring)");
    }
    Ok(())
}

/// Name the context after the hub itself when the user didn't pick one.
async fn hub_custom_name(address: &str, port: u16, credential: &Credential) -> Option<String> {
    let client = HubClient::connect(address, port, credential).ok()?;
    let hub = client.hub_status().await.ok()?;
    hub.custom_name()
        .map(str::to_owned)
        .filter(|name| !name.is_empty())
}

/// `user@host`, falling back to a random identifier when the
/// environment gives us nothing.
fn default_client_name() -> String {
    let host = hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .map(|h| match h.split_once('.') {
            Some((short, _)) => short.to_owned(),
            None => h,
        });
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .ok();

    match (user, host) {
        (Some(user), Some(host)) => format!("{user}@{host}"),
        _ => uuid::Uuid::new_v4().to_string(),
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_client_name_is_never_empty() {
        let name = default_client_name();
        assert!(!name.is_empty());
    }
}
