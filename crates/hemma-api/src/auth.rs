// PKCE-style device authorization against the hub.
//
// The ceremony requests a short-lived code, then polls the token endpoint
// until the user confirms by pressing the action button on the hub. The
// first contact runs with trust-on-first-use enabled, so the credential
// that comes back carries both the access token and the certificate
// fingerprint pinned during the handshake.

use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng as _;
use rand::rngs::OsRng;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tokio::time::{self, Instant};
use url::Url;

use crate::error::Error;
use crate::transport::Transport;
use crate::trust::FingerprintPin;

const CODE_ALPHABET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789-._~";
const CODE_VERIFIER_LENGTH: usize = 128;

/// OAuth audience the hub expects on the authorize request.
const AUDIENCE: &str = "homesmart.local";

// ── Credential ───────────────────────────────────────────────────────

/// Long-lived hub credential: the bearer token minted by the ceremony
/// plus the pinned certificate fingerprint.
///
/// Created empty, filled by [`Authorizer::authorize`] (token) and by the
/// TLS verifier (fingerprint, on the first trusted handshake). Shared
/// read-only afterwards by the REST client and the event stream.
#[derive(Debug)]
pub struct Credential {
    access_token: SecretString,
    pin: FingerprintPin,
}

impl Default for Credential {
    fn default() -> Self {
        Self {
            access_token: SecretString::from(""),
            pin: FingerprintPin::default(),
        }
    }
}

impl Credential {
    /// Build a credential from persisted values.
    ///
    /// The fingerprint is normalized, so colon-delimited or
    /// `SHA256=`-prefixed forms work unchanged.
    pub fn new(access_token: &str, fingerprint: &str) -> Self {
        Self {
            access_token: SecretString::from(access_token),
            pin: FingerprintPin::new(fingerprint),
        }
    }

    pub fn access_token(&self) -> &SecretString {
        &self.access_token
    }

    /// The pinned certificate fingerprint, if one has been recorded.
    pub fn fingerprint(&self) -> Option<String> {
        self.pin.pinned()
    }

    pub(crate) fn pin(&self) -> FingerprintPin {
        self.pin.clone()
    }

    /// `Authorization` header value, or `None` while no token exists.
    pub(crate) fn bearer(&self) -> Option<String> {
        let token = self.access_token.expose_secret();
        if token.is_empty() {
            None
        } else {
            Some(format!("Bearer {token}"))
        }
    }

    fn set_access_token(&mut self, token: String) {
        self.access_token = SecretString::from(token);
    }
}

// ── Ceremony policy & progress ───────────────────────────────────────

/// Timing of the token-polling loop.
///
/// A replaceable value so tests can substitute millisecond intervals for
/// the real two-second cadence.
#[derive(Debug, Clone)]
pub struct AuthPolicy {
    /// Delay between token-endpoint polls.
    pub poll_interval: Duration,

    /// Overall deadline for the ceremony.
    pub timeout: Duration,
}

impl Default for AuthPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Progress notifications emitted during the ceremony.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthProgress {
    /// The hub issued an authorization code; the action button on the
    /// hub must now be pressed. Emitted exactly once per ceremony.
    AwaitingConfirmation,

    /// A token poll came back unconfirmed; the ceremony keeps waiting.
    Polling,
}

// ── Authorizer ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct AuthCodeResponse {
    code: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// One-shot authorization ceremony against a hub.
///
/// Consumed by [`authorize`](Self::authorize) -- a new verifier/challenge
/// pair is generated per attempt, so a timed-out ceremony is restarted by
/// building a fresh `Authorizer`.
pub struct Authorizer {
    base: Url,
    client_name: String,
    policy: AuthPolicy,
}

impl Authorizer {
    /// Target a hub by address and port.
    pub fn new(address: &str, port: u16, client_name: &str) -> Result<Self, Error> {
        let base = Url::parse(&format!("https://{address}:{port}/"))?;
        Ok(Self::from_base_url(base, client_name))
    }

    /// Target an explicit base URL.
    ///
    /// Exists for tests and non-standard deployments; `http` bases are
    /// accepted so the ceremony can run against a local mock server.
    pub fn from_base_url(base: Url, client_name: &str) -> Self {
        Self {
            base,
            client_name: client_name.to_owned(),
            policy: AuthPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: AuthPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run the ceremony to completion.
    ///
    /// `progress` is invoked with [`AuthProgress::AwaitingConfirmation`]
    /// exactly once after the code is obtained, then with
    /// [`AuthProgress::Polling`] after every unconfirmed poll. Transport
    /// failures abort immediately; only "button not yet pressed"
    /// responses keep the loop alive.
    pub async fn authorize(
        self,
        mut progress: impl FnMut(AuthProgress),
    ) -> Result<Credential, Error> {
        let verifier = generate_code_verifier();
        let challenge = code_challenge(&verifier);

        // First contact: nothing pinned yet, so trust-on-first-use is on.
        let mut credential = Credential::default();
        let transport = Transport::new(&credential, true)?;

        let code = self.request_auth_code(&transport, &challenge).await?;
        tracing::debug!("authorization code obtained, waiting for button press");
        progress(AuthProgress::AwaitingConfirmation);

        let token_url = self.base.join("v1/oauth/token")?;
        let deadline = Instant::now() + self.policy.timeout;
        let mut ticker = time::interval_at(
            Instant::now() + self.policy.poll_interval,
            self.policy.poll_interval,
        );

        loop {
            tokio::select! {
                biased;
                () = time::sleep_until(deadline) => return Err(Error::AuthorizationTimedOut),
                _ = ticker.tick() => {
                    match self.poll_token(&transport, &token_url, &verifier, &code).await? {
                        Some(token) => {
                            credential.set_access_token(token);
                            return Ok(credential);
                        }
                        None => progress(AuthProgress::Polling),
                    }
                }
            }
        }
    }

    /// `GET /v1/oauth/authorize` -- returns the short-lived code.
    ///
    /// This call does not block on the button; it only announces the
    /// challenge and obtains the code to redeem later.
    async fn request_auth_code(
        &self,
        transport: &Transport,
        challenge: &str,
    ) -> Result<String, Error> {
        let url = self.base.join("v1/oauth/authorize")?;

        let resp = transport
            .http()
            .get(url.clone())
            .query(&[
                ("response_type", "code"),
                ("audience", AUDIENCE),
                ("code_challenge", challenge),
                ("code_challenge_method", "S256"),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = resp.text().await?;
        let parsed: AuthCodeResponse =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body,
            })?;
        Ok(parsed.code)
    }

    /// `POST /v1/oauth/token` -- one redemption attempt.
    ///
    /// `Ok(None)` means the button has not been pressed yet (any
    /// non-200, or a 200 with an empty token). Transport errors are
    /// fatal and propagate.
    async fn poll_token(
        &self,
        transport: &Transport,
        url: &Url,
        verifier: &str,
        code: &str,
    ) -> Result<Option<String>, Error> {
        let resp = transport
            .http()
            .post(url.clone())
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("code_verifier", verifier),
                ("name", self.client_name.as_str()),
            ])
            .send()
            .await?;

        if resp.status() != reqwest::StatusCode::OK {
            return Ok(None);
        }

        let body = resp.text().await?;
        let parsed: TokenResponse =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body,
            })?;

        if parsed.access_token.is_empty() {
            Ok(None)
        } else {
            Ok(Some(parsed.access_token))
        }
    }
}

// ── PKCE primitives ──────────────────────────────────────────────────

/// Random code verifier: fixed length, URL-safe alphabet, CSPRNG-drawn.
fn generate_code_verifier() -> String {
    (0..CODE_VERIFIER_LENGTH)
        .map(|_| {
            let idx = OsRng.gen_range(0..CODE_ALPHABET.len());
            char::from(CODE_ALPHABET[idx])
        })
        .collect()
}

/// S256 challenge: base64url-no-padding over SHA-256 of the verifier.
fn code_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifier_has_fixed_length_and_alphabet() {
        for _ in 0..16 {
            let verifier = generate_code_verifier();
            assert_eq!(verifier.len(), CODE_VERIFIER_LENGTH);
            assert!(
                verifier.bytes().all(|b| CODE_ALPHABET.contains(&b)),
                "verifier contains byte outside the code alphabet: {verifier}"
            );
        }
    }

    #[test]
    fn challenge_matches_rfc7636_test_vector() {
        // RFC 7636 appendix B.
        assert_eq!(
            code_challenge("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk"),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
    }

    #[test]
    fn challenge_is_deterministic_and_unpadded() {
        let verifier = generate_code_verifier();
        let challenge = code_challenge(&verifier);
        assert_eq!(challenge, code_challenge(&verifier));
        // 32-byte digest encodes to 43 chars without padding.
        assert_eq!(challenge.len(), 43);
        assert!(!challenge.contains('='));
    }

    #[test]
    fn empty_credential_has_no_bearer() {
        let credential = Credential::default();
        assert!(credential.bearer().is_none());
        assert!(credential.fingerprint().is_none());
    }

    #[test]
    fn credential_normalizes_persisted_fingerprint() {
        let credential = Credential::new("tok", "SHA256=AA:BB:CC");
        assert_eq!(credential.fingerprint().as_deref(), Some("aabbcc"));
        assert_eq!(credential.bearer().as_deref(), Some("Bearer tok"));
    }
}
