//! Message channel - ordered queue between decoder and pipeline
//!
//! An unbounded multi-producer FIFO of decoded messages. Order is
//! preserved per channel; the closed state is observed by the receiver
//! as end-of-channel once every sender is dropped (or the receiver
//! calls `close`).

use recon_protocol::Message;
use tokio::sync::mpsc;

use crate::ChannelClosed;

/// Create a connected sender/receiver pair
pub fn message_channel() -> (MessageSender, MessageReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (MessageSender { tx }, MessageReceiver { rx })
}

/// Producer half of a message channel
#[derive(Clone)]
pub struct MessageSender {
    tx: mpsc::UnboundedSender<Message>,
}

impl MessageSender {
    /// Push a message onto the channel
    pub fn send(&self, message: Message) -> Result<(), ChannelClosed> {
        self.tx.send(message).map_err(|_| ChannelClosed)
    }

    /// True if the receiver is gone
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer half of a message channel
pub struct MessageReceiver {
    rx: mpsc::UnboundedReceiver<Message>,
}

impl MessageReceiver {
    /// Receive the next message, or `None` once the channel is closed
    /// and drained
    pub async fn recv(&mut self) -> Option<Message> {
        self.rx.recv().await
    }

    /// Receive without waiting
    pub fn try_recv(&mut self) -> Option<Message> {
        self.rx.try_recv().ok()
    }

    /// Stop accepting new messages; already-queued messages still drain
    pub fn close(&mut self) {
        self.rx.close();
    }
}

impl std::fmt::Debug for MessageSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageSender")
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl std::fmt::Debug for MessageReceiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageReceiver").finish()
    }
}
