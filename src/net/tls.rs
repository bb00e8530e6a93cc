//! TLS configuration and certificate loading.

use std::path::{Path, PathBuf};

use axum_server::tls_rustls::RustlsConfig;

/// Error type for TLS setup.
#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    /// A configured file does not exist.
    #[error("{kind} file not found: {path:?}")]
    NotFound { kind: &'static str, path: PathBuf },

    /// A configured file could not be read or parsed as PEM.
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The certificate file holds no certificates.
    #[error("no certificates found in {0:?}")]
    NoCertificates(PathBuf),

    /// The key file holds no private key.
    #[error("no private key found in {0:?}")]
    NoPrivateKey(PathBuf),

    /// rustls rejected the certificate/key pair.
    #[error("invalid certificate/key pair: {0}")]
    Config(#[source] std::io::Error),
}

/// Load a rustls server configuration from PEM certificate and key files.
pub async fn load_tls_config(cert_path: &Path, key_path: &Path) -> Result<RustlsConfig, TlsError> {
    let cert_pem = read_pem("certificate", cert_path).await?;
    let key_pem = read_pem("private key", key_path).await?;

    let certs = rustls_pemfile::certs(&mut cert_pem.as_slice())
        .map(|cert| cert.map(|c| c.as_ref().to_vec()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| TlsError::Read {
            path: cert_path.to_path_buf(),
            source,
        })?;
    if certs.is_empty() {
        return Err(TlsError::NoCertificates(cert_path.to_path_buf()));
    }

    let key = rustls_pemfile::private_key(&mut key_pem.as_slice())
        .map_err(|source| TlsError::Read {
            path: key_path.to_path_buf(),
            source,
        })?
        .ok_or_else(|| TlsError::NoPrivateKey(key_path.to_path_buf()))?;

    let config = RustlsConfig::from_der(certs, key.secret_der().to_vec())
        .await
        .map_err(TlsError::Config)?;

    tracing::info!(cert = ?cert_path, key = ?key_path, "TLS configuration loaded");
    Ok(config)
}

async fn read_pem(kind: &'static str, path: &Path) -> Result<Vec<u8>, TlsError> {
    if !path.exists() {
        return Err(TlsError::NotFound {
            kind,
            path: path.to_path_buf(),
        });
    }
    tokio::fs::read(path).await.map_err(|source| TlsError::Read {
        path: path.to_path_buf(),
        source,
    })
}
