//! Row-swap protocol handler.
//!
//! A stateless per-request loop: decode the swap request, invoke the
//! engine, reply with the outcome text. Any failure to decode the request
//! yields the fixed malformed-request outcome rather than a process-level
//! error; only socket-layer failures are fatal.

use rowswap_common::TransportError;
use rowswap_wire::frame;
use rowswap_wire::swap::{SwapRequest, OUTCOME_MALFORMED, OUTCOME_OK};
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tracing::debug;

use crate::swap_file::SwapFile;

/// Server-side loop answering swap datagrams for one target file.
#[derive(Debug)]
pub struct SwapHandler {
    socket: UdpSocket,
    file: SwapFile,
}

impl SwapHandler {
    /// Binds the handler to `addr`.
    pub async fn bind(addr: SocketAddr, file: SwapFile) -> Result<Self, TransportError> {
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|source| TransportError::Bind { addr, source })?;
        Ok(Self { socket, file })
    }

    /// Returns the address the handler is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.socket.local_addr()
    }

    /// Returns the engine's startup line count.
    pub fn line_count(&self) -> u64 {
        self.file.line_count()
    }

    /// Runs the receive loop until a transport failure.
    pub async fn run(mut self) -> Result<(), TransportError> {
        let mut buf = [0u8; frame::MAX_DATAGRAM];

        loop {
            let (len, peer) = self
                .socket
                .recv_from(&mut buf)
                .await
                .map_err(|source| TransportError::Receive { source })?;

            let outcome = self.handle_request(&buf[..len]).await;
            debug!("Swap request from {} -> {}", peer, outcome);

            let reply = frame::encode_text(clip_outcome(&outcome))
                .map_err(|source| TransportError::Encode { source })?;
            self.socket
                .send_to(&reply, peer)
                .await
                .map_err(|source| TransportError::Send { peer, source })?;
        }
    }

    /// Produces the outcome text for one datagram.
    async fn handle_request(&mut self, datagram: &[u8]) -> String {
        let request = match frame::decode_text(datagram).map(SwapRequest::parse) {
            Ok(Ok(request)) => request,
            _ => return OUTCOME_MALFORMED.to_string(),
        };

        match self.file.swap(request.line1, request.line2).await {
            Ok(()) => OUTCOME_OK.to_string(),
            Err(e) => e.to_string(),
        }
    }
}

/// Bounds an outcome description to what one reply frame can carry.
///
/// Long I/O error descriptions (which embed paths) would otherwise make the
/// response frame encoder fail loudly and tear the handler down.
fn clip_outcome(outcome: &str) -> &str {
    const MAX_TEXT: usize = frame::MAX_DATAGRAM - 2;
    if outcome.len() <= MAX_TEXT {
        return outcome;
    }
    let mut end = MAX_TEXT;
    while !outcome.is_char_boundary(end) {
        end -= 1;
    }
    &outcome[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn bound_handler(lines: &[&str]) -> (SwapHandler, std::path::PathBuf, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("target.txt");
        let mut content = lines.join("\n");
        content.push('\n');
        tokio::fs::write(&path, content).await.unwrap();

        let file = SwapFile::open(&path).await.unwrap();
        let handler = SwapHandler::bind("127.0.0.1:0".parse().unwrap(), file)
            .await
            .unwrap();
        (handler, path, dir)
    }

    #[tokio::test]
    async fn test_swap_request_succeeds() {
        let (mut handler, path, _dir) = bound_handler(&["a", "b", "c"]).await;

        let datagram = SwapRequest::new(0, 2).encode().unwrap();
        assert_eq!(handler.handle_request(&datagram).await, OUTCOME_OK);
        assert_eq!(
            tokio::fs::read_to_string(&path).await.unwrap(),
            "c\nb\na\n"
        );
    }

    #[tokio::test]
    async fn test_out_of_range_reported_as_outcome() {
        let (mut handler, path, _dir) = bound_handler(&["a", "b", "c"]).await;
        let original = tokio::fs::read_to_string(&path).await.unwrap();

        let datagram = SwapRequest::new(3, 0).encode().unwrap();
        let outcome = handler.handle_request(&datagram).await;
        assert!(outcome.contains("out of range"));
        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), original);
    }

    #[tokio::test]
    async fn test_malformed_payloads() {
        let (mut handler, _path, _dir) = bound_handler(&["a", "b"]).await;

        // Bad token text inside a valid frame.
        let datagram = frame::encode_text("zero,one").unwrap();
        assert_eq!(handler.handle_request(&datagram).await, OUTCOME_MALFORMED);

        // Not even a valid frame.
        assert_eq!(handler.handle_request(&[0xff]).await, OUTCOME_MALFORMED);
    }

    #[test]
    fn test_clip_outcome() {
        let short = "OK";
        assert_eq!(clip_outcome(short), short);

        let long = "é".repeat(frame::MAX_DATAGRAM);
        let clipped = clip_outcome(&long);
        assert!(clipped.len() <= frame::MAX_DATAGRAM - 2);
        assert!(frame::encode_text(clipped).is_ok());
    }
}
