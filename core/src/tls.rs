//! Transport security settings for `HttpClient::with_tls`.
//!
//! ```ignore
//! use semhttp::{HttpClient, TlsConfig, TlsVersion};
//!
//! let tls = TlsConfig::new()
//!     .add_root_certificate_pem(&std::fs::read("ca.crt")?)?
//!     .identity_pem(&std::fs::read("client.pem")?)?
//!     .min_tls_version(TlsVersion::Tls1_3);
//! let client = HttpClient::with_tls(tls)?;
//! ```

use reqwest::{Certificate, ClientBuilder, Identity};

use crate::error::{Error, Result};

/// Minimum TLS protocol version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsVersion {
    #[default]
    Tls1_2,
    Tls1_3,
}

impl TlsVersion {
    fn to_reqwest_version(self) -> reqwest::tls::Version {
        match self {
            TlsVersion::Tls1_2 => reqwest::tls::Version::TLS_1_2,
            TlsVersion::Tls1_3 => reqwest::tls::Version::TLS_1_3,
        }
    }
}

/// Trust and identity settings. The default leaves transport defaults alone.
#[derive(Default)]
pub struct TlsConfig {
    root_certificates: Vec<Certificate>,
    use_only_custom_roots: bool,
    identity: Option<Identity>,
    min_version: Option<TlsVersion>,
    danger_accept_invalid_certs: bool,
}

impl std::fmt::Debug for TlsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsConfig")
            .field("root_certificates", &self.root_certificates.len())
            .field("use_only_custom_roots", &self.use_only_custom_roots)
            .field("identity", &self.identity.is_some())
            .field("min_version", &self.min_version)
            .field("danger_accept_invalid_certs", &self.danger_accept_invalid_certs)
            .finish()
    }
}

impl TlsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trust an additional CA certificate.
    pub fn add_root_certificate(mut self, cert: Certificate) -> Self {
        self.root_certificates.push(cert);
        self
    }

    /// Trust every certificate in a PEM bundle.
    pub fn add_root_certificate_pem(mut self, pem: &[u8]) -> Result<Self> {
        let certs = Certificate::from_pem_bundle(pem).map_err(Error::Tls)?;
        self.root_certificates.extend(certs);
        Ok(self)
    }

    /// Trust only the added roots, not the built-in ones.
    pub fn tls_certs_only(mut self) -> Self {
        self.use_only_custom_roots = true;
        self
    }

    /// Client certificate for mutual TLS.
    pub fn identity(mut self, identity: Identity) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Client certificate chain and private key from one PEM buffer.
    pub fn identity_pem(self, pem: &[u8]) -> Result<Self> {
        let identity = Identity::from_pem(pem).map_err(Error::Tls)?;
        Ok(self.identity(identity))
    }

    pub fn min_tls_version(mut self, version: TlsVersion) -> Self {
        self.min_version = Some(version);
        self
    }

    /// Skip server certificate verification. Only for tests.
    pub fn danger_accept_invalid_certs(mut self) -> Self {
        self.danger_accept_invalid_certs = true;
        self
    }

    pub(crate) fn apply(self, mut builder: ClientBuilder) -> ClientBuilder {
        builder = builder.use_rustls_tls();
        for cert in self.root_certificates {
            builder = builder.add_root_certificate(cert);
        }
        if self.use_only_custom_roots {
            builder = builder.tls_built_in_root_certs(false);
        }
        if let Some(identity) = self.identity {
            builder = builder.identity(identity);
        }
        if let Some(version) = self.min_version {
            builder = builder.min_tls_version(version.to_reqwest_version());
        }
        if self.danger_accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }
        builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_builds_a_transport() {
        let builder = TlsConfig::new().apply(reqwest::Client::builder());
        assert!(builder.build().is_ok());
    }

    #[test]
    fn full_config_builds_a_transport() {
        let builder = TlsConfig::new()
            .min_tls_version(TlsVersion::Tls1_3)
            .danger_accept_invalid_certs()
            .apply(reqwest::Client::builder());
        assert!(builder.build().is_ok());
    }

    #[test]
    fn identity_without_key_is_rejected() {
        let err = TlsConfig::new().identity_pem(b"not a pem").unwrap_err();
        assert!(matches!(err, Error::Tls(_)));
    }

    #[test]
    fn debug_hides_material() {
        let text = format!("{:?}", TlsConfig::new().tls_certs_only());
        assert!(text.contains("use_only_custom_roots: true"));
        assert!(text.contains("identity: false"));
    }
}
