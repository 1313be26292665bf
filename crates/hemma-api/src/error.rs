use thiserror::Error;

/// Top-level error type for the `hemma-api` crate.
///
/// Covers every failure mode across the client: certificate trust,
/// the authorization ceremony, the REST surface, the event stream,
/// and hub discovery. The CLI maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Certificate trust ───────────────────────────────────────────
    /// The hub presented a certificate but nothing is pinned yet and
    /// trust-on-first-use is disabled for this connection.
    #[error("no certificate pinned for this hub and auto-trust is disabled")]
    UntrustedCertificate,

    /// The presented certificate does not match the pinned fingerprint.
    /// This is never retried — it may indicate an impersonated hub.
    #[error("certificate fingerprint mismatch: pinned {pinned}, presented {presented}")]
    FingerprintMismatch { pinned: String, presented: String },

    // ── Authorization ───────────────────────────────────────────────
    /// The action button was not pressed before the ceremony deadline.
    #[error("authorization not confirmed in time -- restart the ceremony and press the hub button")]
    AuthorizationTimedOut,

    /// Request rejected by the hub (401/403).
    #[error("authentication rejected: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, TLS, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS configuration could not be built.
    #[error("TLS configuration error: {0}")]
    Tls(String),

    /// Non-success HTTP status from the hub API.
    #[error("hub API error (HTTP {status}) at {url}")]
    Api { status: u16, url: String },

    // ── Event stream ────────────────────────────────────────────────
    /// `run` was called while an event stream is already active.
    #[error("event stream is already running")]
    AlreadyRunning,

    /// WebSocket connect or read failure.
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Discovery ───────────────────────────────────────────────────
    /// mDNS browse failure.
    #[error("mDNS discovery error: {0}")]
    Discovery(String),
}

impl Error {
    /// Returns `true` for security-critical trust failures that must
    /// never be retried automatically.
    pub fn is_trust_failure(&self) -> bool {
        matches!(
            self,
            Self::UntrustedCertificate | Self::FingerprintMismatch { .. }
        )
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::WebSocket(_) => true,
            _ => false,
        }
    }
}
