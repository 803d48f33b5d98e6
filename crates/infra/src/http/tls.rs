//! TLS configuration for calls that skip peer verification
//!
//! The certificate chain is not validated against any trust anchor, but the
//! leaf certificate must still be issued for the host being contacted and
//! handshake signatures are still checked.

use std::sync::Arc;

use cloudapi_domain::{CloudApiError, Result};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::client::verify_server_name;
use rustls::crypto::{verify_tls12_signature, verify_tls13_signature, CryptoProvider};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::server::ParsedCertificate;
use rustls::{ClientConfig, DigitallySignedStruct, SignatureScheme};

/// Accepts any issuer, checks the subject name against the server name.
#[derive(Debug)]
pub(crate) struct HostnameOnlyVerifier {
    provider: Arc<CryptoProvider>,
}

impl HostnameOnlyVerifier {
    pub(crate) fn new(provider: Arc<CryptoProvider>) -> Self {
        Self { provider }
    }
}

impl ServerCertVerifier for HostnameOnlyVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        let certificate = ParsedCertificate::try_from(end_entity)?;
        verify_server_name(&certificate, server_name)?;
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(message, cert, dss, &self.provider.signature_verification_algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(message, cert, dss, &self.provider.signature_verification_algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider.signature_verification_algorithms.supported_schemes()
    }
}

/// Client config whose only certificate check is the host name.
pub(crate) fn hostname_only_config() -> Result<ClientConfig> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let verifier = Arc::new(HostnameOnlyVerifier::new(Arc::clone(&provider)));

    let mut config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|err| CloudApiError::Config(format!("Invalid TLS configuration: {}", err)))?
        .dangerous()
        .with_custom_certificate_verifier(verifier)
        .with_no_client_auth();
    config.alpn_protocols = vec![b"http/1.1".to_vec()];
    Ok(config)
}

#[cfg(test)]
mod tests {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    use super::*;

    const FIXTURE_PEM: &str = include_str!("../../tests/fixtures/cloudapi-test.pem");

    fn fixture_der() -> CertificateDer<'static> {
        let body: String = FIXTURE_PEM.lines().filter(|line| !line.starts_with("-----")).collect();
        CertificateDer::from(STANDARD.decode(body).unwrap())
    }

    fn verifier() -> HostnameOnlyVerifier {
        HostnameOnlyVerifier::new(Arc::new(rustls::crypto::ring::default_provider()))
    }

    fn verify(host: &'static str) -> std::result::Result<ServerCertVerified, rustls::Error> {
        let name = ServerName::try_from(host).unwrap();
        verifier().verify_server_cert(&fixture_der(), &[], &name, &[], UnixTime::now())
    }

    #[test]
    fn untrusted_issuer_is_accepted_for_matching_host() {
        assert!(verify("cloudapi.test").is_ok());
    }

    #[test]
    fn mismatched_host_is_rejected() {
        assert!(verify("cloudapi.example.com").is_err());
        assert!(verify("other.cloudapi.test").is_err());
    }

    #[test]
    fn garbage_certificate_is_rejected() {
        let name = ServerName::try_from("cloudapi.test").unwrap();
        let garbage = CertificateDer::from(vec![0x30, 0x03, 0x01, 0x01, 0xff]);
        assert!(verifier().verify_server_cert(&garbage, &[], &name, &[], UnixTime::now()).is_err());
    }

    #[test]
    fn config_builds() {
        let config = hostname_only_config().unwrap();
        assert_eq!(config.alpn_protocols, vec![b"http/1.1".to_vec()]);
    }
}
