//! TCP transport: a [`LineFramer`] over `tokio::net::TcpStream`.

use std::net::SocketAddr;

use tokio::net::TcpStream;

use crate::{LineFramer, TransportError};

/// A line framer bound to a TCP socket.
pub type TcpFramer = LineFramer<TcpStream>;

impl LineFramer<TcpStream> {
    /// Resolves `host` and connects to `host:port`.
    ///
    /// # Errors
    /// Returns [`TransportError::ConnectFailed`] if name resolution or the
    /// TCP handshake fails.
    pub async fn open(host: &str, port: u16) -> Result<Self, TransportError> {
        let addr = format!("{host}:{port}");
        let stream = TcpStream::connect((host, port)).await.map_err(|source| {
            TransportError::ConnectFailed {
                addr: addr.clone(),
                source,
            }
        })?;
        // Lockstep request/response of short lines.
        stream
            .set_nodelay(true)
            .map_err(|source| TransportError::ConnectFailed {
                addr: addr.clone(),
                source,
            })?;

        let framer = Self::new(stream);
        tracing::debug!(id = %framer.id(), %addr, "connected");
        Ok(framer)
    }

    /// Returns the address of the remote peer.
    pub fn peer_addr(&self) -> std::io::Result<SocketAddr> {
        self.stream().ok_or_else(not_connected)?.peer_addr()
    }

    /// Returns the local address of the socket.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.stream().ok_or_else(not_connected)?.local_addr()
    }
}

fn not_connected() -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::NotConnected, "connection closed")
}
