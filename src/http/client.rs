//! HTTP client construction per execution mode

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::errors::FlowpulseError;

/// PEM material for client-certificate TLS
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsOptions {
    pub ca_cert: Option<PathBuf>,
    pub client_cert: Option<PathBuf>,
    /// Separate key file; when absent the key is read from `client_cert`
    pub client_key: Option<PathBuf>,
}

impl TlsOptions {
    pub fn is_empty(&self) -> bool {
        self.ca_cert.is_none() && self.client_cert.is_none()
    }
}

fn read_pem(path: &Path) -> Result<Vec<u8>, FlowpulseError> {
    std::fs::read(path).map_err(|e| {
        FlowpulseError::Config(format!("Cannot read '{}': {}", path.display(), e))
    })
}

/// Build a client, adding the CA certificate and identity when configured
pub fn build_client(timeout: Duration, tls: &TlsOptions) -> Result<Client, FlowpulseError> {
    let mut builder = Client::builder()
        .timeout(timeout)
        .user_agent(concat!("flowpulse/", env!("CARGO_PKG_VERSION")));

    if let Some(ref ca_path) = tls.ca_cert {
        let cert = reqwest::Certificate::from_pem(&read_pem(ca_path)?)
            .map_err(|e| FlowpulseError::Config(format!("Invalid CA certificate: {}", e)))?;
        builder = builder.add_root_certificate(cert);
        debug!(path = %ca_path.display(), "Added CA certificate");
    }

    if let Some(ref cert_path) = tls.client_cert {
        let mut pem = read_pem(cert_path)?;
        if let Some(ref key_path) = tls.client_key {
            pem.extend_from_slice(b"\n");
            pem.extend_from_slice(&read_pem(key_path)?);
        }
        let identity = reqwest::Identity::from_pem(&pem)
            .map_err(|e| FlowpulseError::Config(format!("Invalid client certificate/key: {}", e)))?;
        builder = builder.identity(identity);
        debug!(path = %cert_path.display(), "Added client identity");
    }

    builder.build().map_err(FlowpulseError::Request)
}
