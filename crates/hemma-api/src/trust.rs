// Trust-on-first-use certificate pinning.
//
// DIRIGERA hubs present self-signed certificates, so there is no CA path
// to validate. Instead the SHA-256 fingerprint of the leaf certificate is
// pinned on first contact and every later handshake must present the
// exact same certificate.

use std::sync::{Arc, Mutex};

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{DigitallySignedStruct, SignatureScheme};
use sha2::{Digest, Sha256};

use crate::error::Error;

/// Shared, mutable fingerprint slot.
///
/// Cloning yields a handle to the same slot: the slot a [`Credential`]
/// carries is the slot the TLS verifier records into and compares
/// against, so a fingerprint learned during the authorization ceremony
/// is immediately visible to the credential's owner.
///
/// [`Credential`]: crate::auth::Credential
#[derive(Debug, Clone, Default)]
pub struct FingerprintPin(Arc<Mutex<Option<String>>>);

impl FingerprintPin {
    /// Create a pin holding an already-known fingerprint.
    ///
    /// The input is normalized, so values copied from `openssl` output
    /// (`SHA256=AA:BB:...`) work as-is. An empty string yields an empty
    /// pin.
    pub fn new(fingerprint: &str) -> Self {
        let normalized = normalize_fingerprint(fingerprint);
        if normalized.is_empty() {
            Self::default()
        } else {
            Self(Arc::new(Mutex::new(Some(normalized))))
        }
    }

    /// The currently pinned fingerprint, if any.
    pub fn pinned(&self) -> Option<String> {
        self.0.lock().expect("fingerprint pin lock poisoned").clone()
    }
}

/// TLS peer-certificate verification policy pinning a SHA-256 fingerprint.
///
/// With `auto_trust` enabled an empty pin is filled from the first
/// presented certificate (first contact with an unknown hub). With it
/// disabled an empty pin is a hard failure -- there is no prior trust to
/// compare against.
#[derive(Debug)]
pub struct CertificateTruster {
    pin: FingerprintPin,
    auto_trust: bool,
    provider: CryptoProvider,
}

impl CertificateTruster {
    pub fn new(pin: FingerprintPin, auto_trust: bool) -> Self {
        Self {
            pin,
            auto_trust,
            provider: rustls::crypto::ring::default_provider(),
        }
    }

    /// Apply the pinning policy to a DER-encoded leaf certificate.
    ///
    /// This is the whole trust decision; the [`ServerCertVerifier`] impl
    /// below only adapts it to the rustls handshake machinery.
    pub fn verify_der(&self, der: &[u8]) -> Result<(), Error> {
        let fingerprint = hex::encode(Sha256::digest(der));

        let mut slot = self.pin.0.lock().expect("fingerprint pin lock poisoned");
        if let Some(pinned) = slot.as_deref() {
            if pinned == fingerprint {
                return Ok(());
            }
            return Err(Error::FingerprintMismatch {
                pinned: pinned.to_owned(),
                presented: fingerprint,
            });
        }
        if self.auto_trust {
            tracing::debug!(%fingerprint, "pinning certificate on first use");
            *slot = Some(fingerprint);
            return Ok(());
        }
        Err(Error::UntrustedCertificate)
    }
}

impl ServerCertVerifier for CertificateTruster {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        self.verify_der(end_entity.as_ref())
            .map(|()| ServerCertVerified::assertion())
            .map_err(|e| {
                tracing::error!(error = %e, "rejecting hub certificate");
                rustls::Error::General(e.to_string())
            })
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}

/// Normalize an externally supplied fingerprint to lowercase hex with no
/// separators.
///
/// Accepts the forms `openssl x509 -fingerprint` produces: an optional
/// `ALGO=` prefix and colon-delimited uppercase bytes.
pub fn normalize_fingerprint(input: &str) -> String {
    let raw = input.split_once('=').map_or(input, |(_, rest)| rest);
    raw.replace(':', "").to_ascii_lowercase()
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // Arbitrary DER stand-ins: the policy hashes whatever bytes the
    // handshake presents, it does not parse them.
    const CERT_A: &[u8] = b"certificate-a";
    const CERT_B: &[u8] = b"certificate-b";

    fn fingerprint_of(der: &[u8]) -> String {
        hex::encode(Sha256::digest(der))
    }

    #[test]
    fn first_use_records_fingerprint_when_auto_trust() {
        let pin = FingerprintPin::default();
        let truster = CertificateTruster::new(pin.clone(), true);

        truster.verify_der(CERT_A).expect("first contact should succeed");
        assert_eq!(pin.pinned(), Some(fingerprint_of(CERT_A)));
    }

    #[test]
    fn empty_pin_without_auto_trust_is_rejected() {
        let truster = CertificateTruster::new(FingerprintPin::default(), false);

        let err = truster.verify_der(CERT_A).expect_err("no prior trust");
        assert!(matches!(err, Error::UntrustedCertificate));
    }

    #[test]
    fn same_certificate_passes_strict_verification() {
        let pin = FingerprintPin::default();
        CertificateTruster::new(pin.clone(), true)
            .verify_der(CERT_A)
            .expect("first contact");

        // Second session, auto-trust disabled, same certificate.
        CertificateTruster::new(pin, false)
            .verify_der(CERT_A)
            .expect("pinned certificate should match");
    }

    #[test]
    fn different_certificate_is_a_mismatch() {
        let pin = FingerprintPin::default();
        CertificateTruster::new(pin.clone(), true)
            .verify_der(CERT_A)
            .expect("first contact");

        let err = CertificateTruster::new(pin.clone(), false)
            .verify_der(CERT_B)
            .expect_err("different certificate must be rejected");
        match err {
            Error::FingerprintMismatch { pinned, presented } => {
                assert_eq!(pinned, fingerprint_of(CERT_A));
                assert_eq!(presented, fingerprint_of(CERT_B));
            }
            other => panic!("expected FingerprintMismatch, got: {other:?}"),
        }
        // The pin itself is untouched by the failed attempt.
        assert_eq!(pin.pinned(), Some(fingerprint_of(CERT_A)));
    }

    #[test]
    fn mismatch_even_with_auto_trust() {
        // Auto-trust only fills an empty slot; it never overwrites.
        let pin = FingerprintPin::new(&fingerprint_of(CERT_A));
        let err = CertificateTruster::new(pin, true)
            .verify_der(CERT_B)
            .expect_err("pinned fingerprint wins over auto-trust");
        assert!(matches!(err, Error::FingerprintMismatch { .. }));
    }

    #[test]
    fn normalize_strips_prefix_and_colons() {
        assert_eq!(normalize_fingerprint("SHA256=AA:BB:CC"), "aabbcc");
        assert_eq!(normalize_fingerprint("aa:bb:cc"), "aabbcc");
        assert_eq!(normalize_fingerprint("AABBCC"), "aabbcc");
        assert_eq!(normalize_fingerprint("aabbcc"), "aabbcc");
        assert_eq!(normalize_fingerprint(""), "");
    }

    #[test]
    fn pin_from_openssl_form_matches_raw_hex() {
        let fingerprint = fingerprint_of(CERT_A).to_uppercase();
        let colon_delimited: Vec<String> = fingerprint
            .as_bytes()
            .chunks(2)
            .map(|pair| String::from_utf8_lossy(pair).into_owned())
            .collect();
        let openssl_form = format!("SHA256={}", colon_delimited.join(":"));

        let pin = FingerprintPin::new(&openssl_form);
        CertificateTruster::new(pin, false)
            .verify_der(CERT_A)
            .expect("normalized pin should match");
    }
}
