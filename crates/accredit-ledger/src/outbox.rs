use chrono::Utc;
use tokio::sync::broadcast;

use accredit_core::{EventRecord, LedgerEvent};

/// Sequenced log of committed ledger events.
///
/// Observers either poll with [`EventOutbox::since`] or take a live
/// [`broadcast::Receiver`]. A lagging receiver loses live events but can
/// catch up from the log.
///
/// Only a window of recent events is held in memory: at least `retention`
/// and never more than twice that. Sequence numbers keep counting across
/// trimming and restarts. Durable history is the host's concern.
#[derive(Debug)]
pub struct EventOutbox {
    records: Vec<EventRecord>,
    next_seq: u64,
    retention: usize,
    sender: broadcast::Sender<EventRecord>,
}

impl EventOutbox {
    pub fn new(capacity: usize, retention: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            records: Vec::new(),
            next_seq: 0,
            retention: retention.max(1),
            sender,
        }
    }

    /// Rebuild the window after a restart. `next_seq` is the counter saved
    /// with the ledger state; events in `records` may run past it when they
    /// were logged after the last state write.
    pub fn restore(
        mut records: Vec<EventRecord>,
        next_seq: u64,
        capacity: usize,
        retention: usize,
    ) -> Self {
        let mut outbox = Self::new(capacity, retention);
        records.sort_by_key(|r| r.seq);
        records.dedup_by_key(|r| r.seq);
        let logged_next = records.last().map_or(0, |r| r.seq + 1);
        outbox.next_seq = next_seq.max(logged_next);
        let excess = records.len().saturating_sub(outbox.retention);
        records.drain(..excess);
        outbox.records = records;
        outbox
    }

    /// Append an event and notify live subscribers. Returns its sequence number.
    pub fn publish(&mut self, event: LedgerEvent) -> u64 {
        let seq = self.next_seq;
        let record = EventRecord {
            seq,
            at: Utc::now(),
            event,
        };
        tracing::debug!(seq, event = %record.event, "event published");
        // No live subscribers is fine
        let _ = self.sender.send(record.clone());
        self.records.push(record);
        self.next_seq += 1;

        if self.records.len() >= self.retention * 2 {
            let excess = self.records.len() - self.retention;
            self.records.drain(..excess);
            tracing::debug!(dropped = excess, oldest = self.oldest_seq(), "event window trimmed");
        }
        seq
    }

    /// Retained records with `seq >= from`, oldest first. Records older than
    /// the window are gone; the first returned `seq` shows the gap.
    pub fn since(&self, from: u64) -> &[EventRecord] {
        let start = self.records.partition_point(|r| r.seq < from);
        &self.records[start..]
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventRecord> {
        self.sender.subscribe()
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Sequence number of the oldest retained record.
    pub fn oldest_seq(&self) -> u64 {
        self.records.first().map_or(self.next_seq, |r| r.seq)
    }

    /// Sequence number the next event will get.
    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    /// Number of retained records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
