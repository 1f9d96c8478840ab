//! Certificate pinning for the router's self-signed certificate
//!
//! Chain/CA validation is replaced by a single check: the SHA-1 thumbprint of
//! the presented leaf certificate must be accepted by a [`TrustPolicy`].
//! Handshake signatures are still verified by rustls.

use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use rustls::client::{ServerCertVerified, ServerCertVerifier};
use rustls::{Certificate, CertificateError, ClientConfig, ServerName};
use sha1::{Digest, Sha1};

/// Decides whether a presented certificate fingerprint is trusted
pub trait TrustPolicy: Send + Sync {
    fn accepts(&self, fingerprint: &str) -> bool;
}

/// Accepts exactly one thumbprint (hex, case-insensitive)
#[derive(Debug, Clone)]
pub struct PinnedThumbprint {
    thumbprint: String,
}

impl PinnedThumbprint {
    pub fn new(thumbprint: impl Into<String>) -> Self {
        Self {
            thumbprint: thumbprint.into(),
        }
    }
}

impl TrustPolicy for PinnedThumbprint {
    fn accepts(&self, fingerprint: &str) -> bool {
        !self.thumbprint.is_empty() && fingerprint.eq_ignore_ascii_case(&self.thumbprint)
    }
}

impl<F> TrustPolicy for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn accepts(&self, fingerprint: &str) -> bool {
        self(fingerprint)
    }
}

/// Upper-case hex SHA-1 over the DER encoded certificate
pub fn thumbprint(der: &[u8]) -> String {
    hex::encode_upper(Sha1::digest(der))
}

/// Last fingerprint refused by the verifier, shared with the transport so a
/// failed request can be reported as a trust failure
#[derive(Debug, Clone, Default)]
pub struct RejectionLog(Arc<Mutex<Option<String>>>);

impl RejectionLog {
    fn record(&self, fingerprint: String) {
        if let Ok(mut slot) = self.0.lock() {
            *slot = Some(fingerprint);
        }
    }

    pub fn take(&self) -> Option<String> {
        self.0.lock().ok().and_then(|mut slot| slot.take())
    }
}

pub struct PinnedCertVerifier {
    policy: Arc<dyn TrustPolicy>,
    rejections: RejectionLog,
}

impl PinnedCertVerifier {
    pub fn new(policy: Arc<dyn TrustPolicy>, rejections: RejectionLog) -> Self {
        Self { policy, rejections }
    }
}

impl ServerCertVerifier for PinnedCertVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &Certificate,
        _intermediates: &[Certificate],
        _server_name: &ServerName,
        _scts: &mut dyn Iterator<Item = &[u8]>,
        _ocsp_response: &[u8],
        _now: SystemTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        let presented = thumbprint(&end_entity.0);
        if self.policy.accepts(&presented) {
            tracing::debug!("[Router] Certificate {} accepted", presented);
            Ok(ServerCertVerified::assertion())
        } else {
            tracing::warn!("[Router] Certificate {} rejected", presented);
            self.rejections.record(presented);
            Err(rustls::Error::InvalidCertificate(
                CertificateError::ApplicationVerificationFailure,
            ))
        }
    }
}

/// Client TLS configuration trusting only what `policy` accepts
pub fn pinned_client_config(policy: Arc<dyn TrustPolicy>, rejections: RejectionLog) -> ClientConfig {
    ClientConfig::builder()
        .with_safe_defaults()
        .with_custom_certificate_verifier(Arc::new(PinnedCertVerifier::new(policy, rejections)))
        .with_no_client_auth()
}
