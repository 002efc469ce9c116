//! Newline framing over an arbitrary byte stream.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::watch;

use crate::{Connection, ConnectionId, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// How many bytes a single read asks the stream for.
const READ_CHUNK: usize = 512;

/// Line terminator used in both directions.
const LF: u8 = b'\n';

/// Turns a byte stream into a sequence of text lines.
///
/// Inbound bytes are accumulated until a `\n` shows up; anything after the
/// terminator stays buffered for the next [`recv_line`](Self::recv_line), so
/// framing does not depend on how the peer's writes were chunked.
pub struct LineFramer<S> {
    id: ConnectionId,
    stream: Option<S>,
    buf: Vec<u8>,
    close_tx: Arc<watch::Sender<bool>>,
    close_rx: watch::Receiver<bool>,
}

impl<S> LineFramer<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Wraps an already connected stream.
    pub fn new(stream: S) -> Self {
        let (close_tx, close_rx) = watch::channel(false);
        Self {
            id: ConnectionId::new(
                NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
            ),
            stream: Some(stream),
            buf: Vec::new(),
            close_tx: Arc::new(close_tx),
            close_rx,
        }
    }

    /// Returns the unique identifier for this connection.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Returns a handle that can close this framer from another task.
    pub fn close_handle(&self) -> CloseHandle {
        CloseHandle {
            tx: Arc::clone(&self.close_tx),
        }
    }

    /// Returns `true` once the stream has been released.
    pub fn is_closed(&self) -> bool {
        self.stream.is_none() || *self.close_rx.borrow()
    }

    /// Sends `text`, followed by `\n` unless it already ends with one.
    ///
    /// The whole line is written and flushed before this returns.
    pub async fn send_line(&mut self, text: &str) -> Result<(), TransportError> {
        self.check_open()?;
        let Some(stream) = self.stream.as_mut() else {
            return Err(closed_locally());
        };

        let mut line = String::with_capacity(text.len() + 1);
        line.push_str(text);
        if !line.ends_with('\n') {
            line.push('\n');
        }

        stream
            .write_all(line.as_bytes())
            .await
            .map_err(TransportError::SendFailed)?;
        stream.flush().await.map_err(TransportError::SendFailed)?;

        tracing::trace!(id = %self.id, line = text.trim_end_matches('\n'), "sent line");
        Ok(())
    }

    /// Receives the next line with the trailing `\n` (and a `\r` before it,
    /// if any) removed.
    pub async fn recv_line(&mut self) -> Result<String, TransportError> {
        self.check_open()?;
        loop {
            if let Some(pos) = self.buf.iter().position(|&b| b == LF) {
                let mut line: Vec<u8> = self.buf.drain(..=pos).collect();
                line.pop();
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
                let text =
                    String::from_utf8(line).map_err(TransportError::InvalidUtf8)?;
                tracing::trace!(id = %self.id, line = %text, "received line");
                return Ok(text);
            }
            self.fill().await?;
        }
    }

    /// Releases the stream. Calling this again does nothing.
    pub async fn close(&mut self) {
        self.close_tx.send_replace(true);
        if let Some(mut stream) = self.stream.take() {
            // The peer may already be gone; there is nobody to report to.
            let _ = stream.shutdown().await;
            tracing::debug!(id = %self.id, "connection closed");
        }
    }

    /// Reads one chunk from the stream into the buffer.
    async fn fill(&mut self) -> Result<(), TransportError> {
        self.check_open()?;
        let Some(stream) = self.stream.as_mut() else {
            return Err(closed_locally());
        };

        let mut chunk = [0u8; READ_CHUNK];
        // `changed()` resolves as soon as a CloseHandle flips the flag, so a
        // read that would otherwise block forever is abandoned.
        let read = tokio::select! {
            biased;
            _ = self.close_rx.changed() => None,
            res = stream.read(&mut chunk) => Some(res),
        };

        match read {
            None => {
                self.release();
                Err(closed_locally())
            }
            Some(Ok(0)) => {
                tracing::debug!(
                    id = %self.id,
                    pending = self.buf.len(),
                    "peer closed the connection"
                );
                self.release();
                Err(TransportError::ConnectionClosed(
                    "peer closed the connection before end of line".into(),
                ))
            }
            Some(Ok(n)) => {
                self.buf.extend_from_slice(&chunk[..n]);
                Ok(())
            }
            Some(Err(e)) => Err(TransportError::ReceiveFailed(e)),
        }
    }

    fn check_open(&mut self) -> Result<(), TransportError> {
        if *self.close_rx.borrow() {
            self.release();
        }
        if self.stream.is_none() {
            return Err(closed_locally());
        }
        Ok(())
    }

    /// Drops the stream without the async shutdown handshake.
    fn release(&mut self) {
        if self.stream.take().is_some() {
            tracing::debug!(id = %self.id, "connection released");
        }
    }

    #[cfg(feature = "tcp")]
    pub(crate) fn stream(&self) -> Option<&S> {
        self.stream.as_ref()
    }
}

impl<S> fmt::Debug for LineFramer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineFramer")
            .field("id", &self.id)
            .field("open", &self.stream.is_some())
            .field("buffered", &self.buf.len())
            .finish()
    }
}

impl<S> Connection for LineFramer<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn send_line(&mut self, line: &str) -> Result<(), TransportError> {
        LineFramer::send_line(self, line).await
    }

    async fn recv_line(&mut self) -> Result<String, TransportError> {
        LineFramer::recv_line(self).await
    }

    async fn close(&mut self) {
        LineFramer::close(self).await
    }

    fn is_closed(&self) -> bool {
        LineFramer::is_closed(self)
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}

fn closed_locally() -> TransportError {
    TransportError::ConnectionClosed("connection was closed locally".into())
}

/// Closes a [`LineFramer`] from outside the task that is using it.
///
/// This is the cancellation mechanism: an operation blocked in
/// [`LineFramer::recv_line`] fails with
/// [`TransportError::ConnectionClosed`] as soon as [`close`](Self::close)
/// is called, and every later operation fails the same way.
#[derive(Debug, Clone)]
pub struct CloseHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CloseHandle {
    /// Signals the framer to release its stream.
    pub fn close(&self) {
        self.tx.send_replace(true);
    }

    /// Returns `true` if [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        *self.tx.borrow()
    }
}
