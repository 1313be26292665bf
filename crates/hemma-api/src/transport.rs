// Shared transport wiring for HTTPS and WebSocket connections.
//
// Both the REST client and the event stream talk to the hub through the
// same pinned-fingerprint TLS policy and the same bearer header; this
// module builds that pair once so the two surfaces cannot drift apart.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};

use crate::auth::Credential;
use crate::error::Error;
use crate::trust::CertificateTruster;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!("hemma/", env!("CARGO_PKG_VERSION"));

/// Authenticated transport bound to one credential.
///
/// Every HTTPS request carries `Authorization: Bearer {token}` once the
/// credential holds a token, and every TLS handshake -- HTTP and
/// WebSocket alike -- runs through the [`CertificateTruster`] sharing the
/// credential's fingerprint pin.
#[derive(Debug, Clone)]
pub struct Transport {
    http: reqwest::Client,
    tls: Arc<rustls::ClientConfig>,
    bearer: Option<String>,
}

impl Transport {
    /// Build a transport for the given credential.
    ///
    /// `auto_trust` selects the trust-on-first-use behavior of the
    /// certificate verifier: enabled only for the authorization
    /// ceremony's first contact, disabled everywhere else.
    pub fn new(credential: &Credential, auto_trust: bool) -> Result<Self, Error> {
        let truster = CertificateTruster::new(credential.pin(), auto_trust);

        let provider = rustls::crypto::ring::default_provider();
        let tls = rustls::ClientConfig::builder_with_provider(Arc::new(provider))
            .with_safe_default_protocol_versions()
            .map_err(|e| Error::Tls(e.to_string()))?
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(truster))
            .with_no_client_auth();
        let tls = Arc::new(tls);

        let bearer = credential.bearer();

        let mut headers = HeaderMap::new();
        if let Some(ref value) = bearer {
            let mut header = HeaderValue::from_str(value).map_err(|_| Error::Authentication {
                message: "access token contains invalid header characters".into(),
            })?;
            header.set_sensitive(true);
            headers.insert(AUTHORIZATION, header);
        }

        let http = reqwest::Client::builder()
            .use_preconfigured_tls((*tls).clone())
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(Error::Transport)?;

        Ok(Self { http, tls, bearer })
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// TLS connector for the WebSocket handshake, carrying the same
    /// pinning policy as the HTTP client.
    pub fn ws_connector(&self) -> tokio_tungstenite::Connector {
        tokio_tungstenite::Connector::Rustls(Arc::clone(&self.tls))
    }

    /// `Authorization` header value for upgrade requests, if a token
    /// exists.
    pub fn bearer(&self) -> Option<&str> {
        self.bearer.as_deref()
    }
}
