//! Native bridge
//!
//! Lets a feature running outside the host process reach a [`Pod`] through
//! a message channel. Each side holds a [`BridgePort`]; messages are JSON
//! strings, the same shape a webview's `postMessage` would carry.
//!
//! ```rust,ignore
//! let (host_port, feature_port) = bridge::channel();
//! tokio::spawn(bridge::serve(pod, host_port));
//! let remote = bridge::connect(feature_port);
//! remote.poly_out().read_dir("").await?;
//! ```
//!
//! [`Pod`]: crate::pod::Pod

mod client;
mod messages;
mod server;

use crate::error::{PodError, Result};

pub use client::{connect, BridgeClient};
pub use messages::{BridgeRequest, BridgeResponse, Payload, RequestEnvelope, ResponseEnvelope};
pub use server::serve;

/// One end of a bridge connection.
#[derive(Clone)]
pub struct BridgePort {
    outgoing: flume::Sender<String>,
    incoming: flume::Receiver<String>,
}

/// A connected pair of ports.
pub fn channel() -> (BridgePort, BridgePort) {
    let (a_tx, a_rx) = flume::unbounded();
    let (b_tx, b_rx) = flume::unbounded();
    (
        BridgePort {
            outgoing: a_tx,
            incoming: b_rx,
        },
        BridgePort {
            outgoing: b_tx,
            incoming: a_rx,
        },
    )
}

impl BridgePort {
    pub async fn send(&self, message: String) -> Result<()> {
        self.outgoing
            .send_async(message)
            .await
            .map_err(|_| PodError::Bridge("peer disconnected".to_string()))
    }

    /// Next message, or `None` once the peer has gone away.
    pub async fn recv(&self) -> Option<String> {
        self.incoming.recv_async().await.ok()
    }
}
