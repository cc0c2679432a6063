//! Transaction status events.

use tokio::sync::broadcast;

use kasa_core::TxnStatus;

/// A status transition on a transaction.
#[derive(Debug, Clone)]
pub struct TxnEvent {
    pub local_id: String,
    pub invoice_number: String,
    pub status: TxnStatus,
}

/// Broadcast fan-out for status transitions. Receipt printers, status
/// bars and the resync indicator all subscribe here.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<TxnEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TxnEvent> {
        self.sender.subscribe()
    }

    /// Send an event. Dropped silently when nobody is listening.
    pub fn emit(&self, local_id: &str, invoice_number: &str, status: TxnStatus) {
        let _ = self.sender.send(TxnEvent {
            local_id: local_id.to_string(),
            invoice_number: invoice_number.to_string(),
            status,
        });
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
