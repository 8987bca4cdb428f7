//! Minimal lower-layer protocol (MLLP) framing and transport
//!
//! A framed message is the start-of-block byte, the message bytes, and the
//! end-of-block byte followed by a carriage return. The client side owns
//! connecting (plain TCP or TLS, optionally skipping certificate
//! validation), writing one framed message, and reading back the
//! acknowledgment bracketed by the same markers.

use std::sync::Arc;
use std::time::Duration;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::TlsConnector;
use tracing::{debug, warn};

use crate::error::PipehatError;
use crate::result::Result;

/// Start-of-block marker (vertical tab).
pub const START_OF_BLOCK: u8 = 0x0B;
/// End-of-block marker (file separator).
pub const END_OF_BLOCK: u8 = 0x1C;
/// Trailer byte following the end-of-block marker.
pub const CARRIAGE_RETURN: u8 = 0x0D;

const END_MARKER: [u8; 2] = [END_OF_BLOCK, CARRIAGE_RETURN];

/// Bracket message text with the MLLP block markers.
pub fn frame(message: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(message.len() + 3);
    bytes.push(START_OF_BLOCK);
    bytes.extend_from_slice(message.as_bytes());
    bytes.push(END_OF_BLOCK);
    bytes.push(CARRIAGE_RETURN);
    bytes
}

/// Strip the block markers back off, tolerating leading or trailing noise.
/// Returns None when the markers are missing or inverted.
pub fn unframe(bytes: &[u8]) -> Option<String> {
    let start = bytes.iter().position(|&b| b == START_OF_BLOCK)?;
    let end = bytes.iter().position(|&b| b == END_OF_BLOCK)?;
    if end < start {
        return None;
    }
    Some(String::from_utf8_lossy(&bytes[start + 1..end]).into_owned())
}

/// Connection behavior for [`MllpClient`].
#[derive(Debug, Clone)]
pub struct SendOptions {
    /// Negotiate TLS after connecting.
    pub tls: bool,
    /// Skip server certificate validation (testing endpoints only).
    pub insecure: bool,
    /// Bound on connecting and on waiting for the acknowledgment.
    pub timeout: Duration,
}

impl Default for SendOptions {
    fn default() -> Self {
        Self {
            tls: false,
            insecure: false,
            timeout: Duration::from_secs(30),
        }
    }
}

/// One-shot MLLP sender: a connection per message, an acknowledgment per
/// connection.
#[derive(Debug, Clone)]
pub struct MllpClient {
    host: String,
    port: u16,
    options: SendOptions,
}

impl MllpClient {
    pub fn new(host: impl Into<String>, port: u16, options: SendOptions) -> Self {
        Self {
            host: host.into(),
            port,
            options,
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Send one message and return the unframed acknowledgment text.
    pub async fn send(&self, message: &str) -> Result<String> {
        let endpoint = self.endpoint();
        let framed = frame(message);
        debug!(%endpoint, bytes = framed.len(), "sending MLLP frame");

        let stream = timeout(self.options.timeout, TcpStream::connect(&endpoint))
            .await
            .map_err(|_| PipehatError::transport(&endpoint, "connect timed out"))?
            .map_err(|err| {
                PipehatError::transport(&endpoint, format!("connect failed: {err}"))
            })?;

        let reply = if self.options.tls {
            let connector = self.tls_connector();
            let server_name = ServerName::try_from(self.host.clone()).map_err(|err| {
                PipehatError::transport(&endpoint, format!("invalid server name: {err}"))
            })?;
            let mut stream = connector.connect(server_name, stream).await.map_err(|err| {
                PipehatError::transport(&endpoint, format!("TLS handshake failed: {err}"))
            })?;
            exchange(&mut stream, &framed, &endpoint, self.options.timeout).await?
        } else {
            let mut stream = stream;
            exchange(&mut stream, &framed, &endpoint, self.options.timeout).await?
        };

        unframe(&reply).ok_or_else(|| {
            PipehatError::transport(&endpoint, "acknowledgment was not MLLP framed")
        })
    }

    fn tls_connector(&self) -> TlsConnector {
        let config = if self.options.insecure {
            warn!("server certificate validation disabled for {}", self.endpoint());
            ClientConfig::builder()
                .dangerous()
                .with_custom_certificate_verifier(Arc::new(NoVerification::new()))
                .with_no_client_auth()
        } else {
            let mut roots = RootCertStore::empty();
            roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
            ClientConfig::builder()
                .with_root_certificates(roots)
                .with_no_client_auth()
        };
        TlsConnector::from(Arc::new(config))
    }
}

async fn exchange<S>(
    stream: &mut S,
    framed: &[u8],
    endpoint: &str,
    deadline: Duration,
) -> Result<Vec<u8>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    stream
        .write_all(framed)
        .await
        .map_err(|err| PipehatError::transport(endpoint, format!("write failed: {err}")))?;
    stream
        .flush()
        .await
        .map_err(|err| PipehatError::transport(endpoint, format!("flush failed: {err}")))?;

    timeout(deadline, read_ack(stream, endpoint))
        .await
        .map_err(|_| PipehatError::transport(endpoint, "timed out waiting for acknowledgment"))?
}

/// Accumulate reply bytes until the end-of-block pair arrives or the peer
/// closes the connection.
async fn read_ack<S>(stream: &mut S, endpoint: &str) -> Result<Vec<u8>>
where
    S: AsyncRead + Unpin,
{
    let mut reply = Vec::new();
    let mut buf = [0u8; 1024];
    loop {
        let n = stream
            .read(&mut buf)
            .await
            .map_err(|err| PipehatError::transport(endpoint, format!("read failed: {err}")))?;
        if n == 0 {
            break;
        }
        reply.extend_from_slice(&buf[..n]);
        if reply.windows(2).any(|window| window == END_MARKER) {
            break;
        }
    }
    Ok(reply)
}

/// Trust-everything verifier for `--insecure` connections, as used when
/// pointing at test endpoints with self-signed certificates.
#[derive(Debug)]
struct NoVerification {
    provider: Arc<rustls::crypto::CryptoProvider>,
}

impl NoVerification {
    fn new() -> Self {
        let provider = rustls::crypto::CryptoProvider::get_default()
            .cloned()
            .unwrap_or_else(|| Arc::new(rustls::crypto::aws_lc_rs::default_provider()));
        Self { provider }
    }
}

impl ServerCertVerifier for NoVerification {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_brackets_the_message() {
        let framed = frame("MSH|x");
        assert_eq!(framed[0], START_OF_BLOCK);
        assert_eq!(&framed[1..6], b"MSH|x");
        assert_eq!(&framed[6..], &END_MARKER);
    }

    #[test]
    fn unframe_inverts_frame() {
        let text = "MSH|^~\\&|A\rPID|1\r";
        assert_eq!(unframe(&frame(text)).unwrap(), text);
    }

    #[test]
    fn unframe_tolerates_surrounding_noise() {
        let mut bytes = vec![0x00, 0x00];
        bytes.extend_from_slice(&frame("ACK"));
        bytes.extend_from_slice(b"trailing");
        assert_eq!(unframe(&bytes).unwrap(), "ACK");
    }

    #[test]
    fn unframe_rejects_unframed_bytes() {
        assert!(unframe(b"no markers here").is_none());
        assert!(unframe(&[END_OF_BLOCK, CARRIAGE_RETURN, START_OF_BLOCK]).is_none());
    }

    #[test]
    fn frame_of_empty_message_is_just_markers() {
        assert_eq!(frame(""), vec![START_OF_BLOCK, END_OF_BLOCK, CARRIAGE_RETURN]);
        assert_eq!(unframe(&frame("")).unwrap(), "");
    }
}
