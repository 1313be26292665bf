//! CLI error types with miette diagnostics.
//!
//! Maps `hemma_api::Error` variants into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

/// Exit codes, stable for scripting.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const TRUST: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Trust ────────────────────────────────────────────────────────

    #[error("certificate verification failed: {message}")]
    #[diagnostic(
        code(hemma::trust),
        help(
            "The hub presented a certificate that does not match the pinned fingerprint.\n\
             If the hub was factory-reset, delete its context and authorize again.\n\
             If it wasn't, someone may be impersonating the hub -- do not proceed."
        )
    )]
    TrustFailure { message: String },

    // ── Authorization ────────────────────────────────────────────────

    #[error("authorization timed out")]
    #[diagnostic(
        code(hemma::auth_timeout),
        help(
            "The action button on the back of the hub was not pressed in time.\n\
             Run the authorize command again and press the button within a minute."
        )
    )]
    AuthTimedOut,

    #[error("the hub rejected the access token")]
    #[diagnostic(
        code(hemma::auth_rejected),
        help(
            "The stored token may have been revoked on the hub.\n\
             Re-run: hemma authorize <ip> --context {context}"
        )
    )]
    AuthRejected { context: String },

    // ── Connection ───────────────────────────────────────────────────

    #[error("could not reach the hub: {reason}")]
    #[diagnostic(
        code(hemma::connection_failed),
        help(
            "Check that the hub is powered and on this network.\n\
             Find it with: hemma list hubs"
        )
    )]
    ConnectionFailed { reason: String },

    #[error("hub API error (HTTP {status}) at {url}")]
    #[diagnostic(code(hemma::api_error))]
    Api { status: u16, url: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("no context selected")]
    #[diagnostic(
        code(hemma::no_context),
        help(
            "Authorize against a hub first: hemma authorize <ip>\n\
             Or select one with --context / hemma use <name>.\n\
             Config expected at: {path}"
        )
    )]
    NoContext { path: String },

    #[error("unknown context '{name}'")]
    #[diagnostic(
        code(hemma::unknown_context),
        help("Available contexts: {available}")
    )]
    UnknownContext { name: String, available: String },

    #[error("no access token stored for context '{context}'")]
    #[diagnostic(
        code(hemma::no_token),
        help(
            "The system keyring has no entry for this context.\n\
             Re-run: hemma authorize <ip> --context {context}"
        )
    )]
    NoToken { context: String },

    #[error(transparent)]
    #[diagnostic(code(hemma::config))]
    Config(Box<figment::Error>),

    #[error("keyring error: {message}")]
    #[diagnostic(
        code(hemma::keyring),
        help("The system keyring is unavailable or denied access.")
    )]
    Keyring { message: String },

    // ── Discovery ────────────────────────────────────────────────────

    #[error("hub discovery failed: {message}")]
    #[diagnostic(
        code(hemma::discovery),
        help("mDNS may be blocked on this network; try the hub's IP directly.")
    )]
    Discovery { message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("invalid value for {field}: {reason}")]
    #[diagnostic(code(hemma::validation))]
    Validation { field: String, reason: String },

    // ── IO / internal ────────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{message}")]
    #[diagnostic(code(hemma::internal))]
    Internal { message: String },
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl From<keyring::Error> for CliError {
    fn from(err: keyring::Error) -> Self {
        Self::Keyring {
            message: err.to_string(),
        }
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Discovery { .. } => exit_code::CONNECTION,
            Self::TrustFailure { .. } => exit_code::TRUST,
            Self::AuthRejected { .. } | Self::NoToken { .. } => exit_code::AUTH,
            Self::AuthTimedOut => exit_code::TIMEOUT,
            Self::Api { status: 404, .. } | Self::UnknownContext { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::NoContext { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Translate an API error within the scope of a named context.
    pub fn from_api(err: hemma_api::Error, context: &str) -> Self {
        match err {
            e if e.is_trust_failure() => Self::TrustFailure {
                message: e.to_string(),
            },
            hemma_api::Error::AuthorizationTimedOut => Self::AuthTimedOut,
            hemma_api::Error::Authentication { .. } => Self::AuthRejected {
                context: context.to_owned(),
            },
            hemma_api::Error::Api { status, url } => Self::Api { status, url },
            hemma_api::Error::Discovery(message) => Self::Discovery { message },
            hemma_api::Error::InvalidUrl(e) => Self::Validation {
                field: "address".into(),
                reason: e.to_string(),
            },
            e @ (hemma_api::Error::Transport(_)
            | hemma_api::Error::WebSocket(_)
            | hemma_api::Error::Tls(_)) => Self::ConnectionFailed {
                reason: e.to_string(),
            },
            e => Self::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl From<hemma_api::Error> for CliError {
    fn from(err: hemma_api::Error) -> Self {
        Self::from_api(err, "current")
    }
}
