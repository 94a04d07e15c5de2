//! Shared node state for HTTP handlers.

use std::time::Instant;
use tokio::sync::mpsc;

use crate::commands::LedgerCommand;

/// State shared by every HTTP handler. Ledger state itself lives in the
/// ledger task and is only reachable through `command_tx`.
pub struct NodeState {
    /// When the node started.
    pub start_time: Instant,
    /// Channel to the ledger task.
    pub command_tx: mpsc::Sender<LedgerCommand>,
}

impl NodeState {
    pub fn new(command_tx: mpsc::Sender<LedgerCommand>) -> Self {
        Self {
            start_time: Instant::now(),
            command_tx,
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
