//! QUIC transport.
//!
//! Clients connect over QUIC with ALPN `statwar`. Each client opens one
//! bidirectional stream and writes action frames on it; the server pushes
//! events back on a unidirectional stream it opens per connection.
//!
//! Certificates come from PEM files when both paths are configured. Without
//! them the server generates a self-signed `localhost` certificate, which is
//! only fit for local play.

use std::{net::SocketAddr, sync::Arc};

use quinn::{Endpoint, RecvStream, SendStream, ServerConfig};
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use statwar_proto::ALPN_PROTOCOL;

use crate::error::ServerError;

/// Listening QUIC endpoint.
pub struct QuicTransport {
    endpoint: Endpoint,
}

impl QuicTransport {
    /// Bind a QUIC endpoint.
    ///
    /// Uses the PEM certificate and key when both are given, a self-signed
    /// certificate otherwise.
    ///
    /// # Errors
    ///
    /// - `ServerError::Config` for a bad address or unusable TLS material
    /// - `ServerError::Transport` if the socket cannot be bound
    pub fn bind(
        address: &str,
        cert_path: Option<&str>,
        key_path: Option<&str>,
    ) -> Result<Self, ServerError> {
        let addr: SocketAddr = address
            .parse()
            .map_err(|e| ServerError::Config(format!("invalid bind address '{address}': {e}")))?;

        let (certs, key) = match (cert_path, key_path) {
            (Some(cert), Some(key)) => load_pem_identity(cert, key)?,
            (None, None) => self_signed_identity()?,
            _ => {
                return Err(ServerError::Config(
                    "--cert and --key must be given together".to_string(),
                ));
            },
        };

        let endpoint = Endpoint::server(quic_server_config(certs, key)?, addr)
            .map_err(|e| ServerError::Transport(format!("failed to bind {addr}: {e}")))?;

        tracing::info!(%addr, "QUIC endpoint bound");
        Ok(Self { endpoint })
    }

    /// Wait for the next completed handshake.
    ///
    /// Returns `None` once the endpoint is closed.
    ///
    /// # Errors
    ///
    /// `ServerError::Transport` if the handshake failed. The endpoint keeps
    /// accepting.
    pub async fn accept(&self) -> Result<Option<QuicConnection>, ServerError> {
        let Some(incoming) = self.endpoint.accept().await else {
            return Ok(None);
        };

        let connection = incoming
            .await
            .map_err(|e| ServerError::Transport(format!("handshake failed: {e}")))?;

        Ok(Some(QuicConnection { connection }))
    }

    /// Address the endpoint is bound to.
    ///
    /// # Errors
    ///
    /// `ServerError::Transport` if the socket has gone away.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        self.endpoint
            .local_addr()
            .map_err(|e| ServerError::Transport(format!("no local address: {e}")))
    }
}

/// One client connection. Clones share the connection.
#[derive(Clone)]
pub struct QuicConnection {
    connection: quinn::Connection,
}

impl QuicConnection {
    /// Wait for the client's action stream.
    ///
    /// # Errors
    ///
    /// `ServerError::Transport` once the connection is closed.
    pub async fn accept_bi(&self) -> Result<(SendStream, RecvStream), ServerError> {
        self.connection
            .accept_bi()
            .await
            .map_err(|e| ServerError::Transport(format!("accept_bi failed: {e}")))
    }

    /// Open the server-to-client event stream.
    ///
    /// # Errors
    ///
    /// `ServerError::Transport` once the connection is closed.
    pub async fn open_uni(&self) -> Result<SendStream, ServerError> {
        self.connection
            .open_uni()
            .await
            .map_err(|e| ServerError::Transport(format!("open_uni failed: {e}")))
    }

    /// Peer address.
    pub fn remote_addr(&self) -> SocketAddr {
        self.connection.remote_address()
    }

    /// Close with an application error code.
    pub fn close(&self, code: u32, reason: &str) {
        self.connection.close(quinn::VarInt::from_u32(code), reason.as_bytes());
    }
}

type Identity = (Vec<CertificateDer<'static>>, PrivateKeyDer<'static>);

fn load_pem_identity(cert_path: &str, key_path: &str) -> Result<Identity, ServerError> {
    let cert_pem = std::fs::read(cert_path)
        .map_err(|e| ServerError::Config(format!("cannot read cert '{cert_path}': {e}")))?;
    let key_pem = std::fs::read(key_path)
        .map_err(|e| ServerError::Config(format!("cannot read key '{key_path}': {e}")))?;

    let certs = rustls_pemfile::certs(&mut &cert_pem[..])
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ServerError::Config(format!("bad certificate PEM: {e}")))?;
    if certs.is_empty() {
        return Err(ServerError::Config(format!("no certificates in '{cert_path}'")));
    }

    let key = rustls_pemfile::private_key(&mut &key_pem[..])
        .map_err(|e| ServerError::Config(format!("bad key PEM: {e}")))?
        .ok_or_else(|| ServerError::Config(format!("no private key in '{key_path}'")))?;

    Ok((certs, key))
}

fn self_signed_identity() -> Result<Identity, ServerError> {
    let generated = rcgen::generate_simple_self_signed(vec!["localhost".to_string()])
        .map_err(|e| ServerError::Config(format!("cannot generate certificate: {e}")))?;

    let cert = generated.cert.der().clone();
    let key = PrivatePkcs8KeyDer::from(generated.key_pair.serialize_der());

    tracing::warn!("using a self-signed certificate; clients must skip verification");
    Ok((vec![cert], key.into()))
}

fn quic_server_config(
    certs: Vec<CertificateDer<'static>>,
    key: PrivateKeyDer<'static>,
) -> Result<ServerConfig, ServerError> {
    let mut tls = rustls::ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .map_err(|e| ServerError::Config(format!("invalid TLS config: {e}")))?;
    tls.alpn_protocols = vec![ALPN_PROTOCOL.to_vec()];

    let crypto = quinn::crypto::rustls::QuicServerConfig::try_from(tls)
        .map_err(|e| ServerError::Config(format!("QUIC config error: {e}")))?;
    Ok(ServerConfig::with_crypto(Arc::new(crypto)))
}
