//! Durable storage for the ledger.
//!
//! Ledger state is one JSON document, rewritten when state changes. Writes
//! go to a temporary file first and are renamed into place, so a crash
//! mid-write leaves the previous snapshot intact.
//!
//! Events go to a separate append-only JSON-lines log, one record per line,
//! so event-only transitions cost one short append.

use anyhow::{Context, Result};
use std::collections::VecDeque;
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use accredit_core::EventRecord;
use accredit_ledger::LedgerSnapshot;

const SNAPSHOT_FILE: &str = "ledger.json";
const SNAPSHOT_TMP: &str = "ledger.json.tmp";
const EVENTS_FILE: &str = "events.jsonl";

/// Snapshot file and event log under the node's data directory.
pub struct SnapshotStore {
    path: PathBuf,
    tmp_path: PathBuf,
    events_path: PathBuf,
}

impl SnapshotStore {
    /// Open the store, creating the data directory if needed.
    pub fn open(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("creating data dir {}", data_dir.display()))?;
        Ok(Self {
            path: data_dir.join(SNAPSHOT_FILE),
            tmp_path: data_dir.join(SNAPSHOT_TMP),
            events_path: data_dir.join(EVENTS_FILE),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn events_path(&self) -> &Path {
        &self.events_path
    }

    /// Read the last snapshot, if one was ever written.
    pub fn load(&self) -> Result<Option<LedgerSnapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.path)?;
        let snapshot = serde_json::from_str(&contents)
            .with_context(|| format!("parsing snapshot {}", self.path.display()))?;
        Ok(Some(snapshot))
    }

    /// Replace the snapshot on disk.
    pub fn save(&self, snapshot: &LedgerSnapshot) -> Result<()> {
        let contents = serde_json::to_vec_pretty(snapshot)?;
        std::fs::write(&self.tmp_path, contents)?;
        std::fs::rename(&self.tmp_path, &self.path)?;
        tracing::debug!(path = %self.path.display(), "snapshot written");
        Ok(())
    }

    /// Append records to the event log and flush them to disk.
    pub fn append_events(&self, records: &[EventRecord]) -> Result<()> {
        let mut buf = Vec::new();
        for record in records {
            serde_json::to_writer(&mut buf, record)?;
            buf.push(b'\n');
        }
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.events_path)
            .with_context(|| format!("opening event log {}", self.events_path.display()))?;

        // Start on a fresh line after a torn write
        if file.metadata()?.len() > 0 {
            let mut last = [0u8; 1];
            file.seek(SeekFrom::End(-1))?;
            file.read_exact(&mut last)?;
            if last[0] != b'\n' {
                buf.insert(0, b'\n');
            }
        }
        file.write_all(&buf)?;
        file.sync_data()?;
        Ok(())
    }

    /// The newest `retention` records of the event log, oldest first.
    ///
    /// Lines that don't parse (a torn write at crash time) are skipped.
    pub fn load_events(&self, retention: usize) -> Result<Vec<EventRecord>> {
        if !self.events_path.exists() {
            return Ok(Vec::new());
        }
        let file = std::fs::File::open(&self.events_path)
            .with_context(|| format!("opening event log {}", self.events_path.display()))?;

        let mut window = VecDeque::with_capacity(retention.min(1024));
        let mut skipped = 0usize;
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<EventRecord>(&line) {
                Ok(record) => {
                    if window.len() == retention {
                        window.pop_front();
                    }
                    window.push_back(record);
                }
                Err(_) => skipped += 1,
            }
        }
        if skipped > 0 {
            tracing::warn!(skipped, path = %self.events_path.display(), "skipped malformed event log lines");
        }
        Ok(window.into())
    }
}
