use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Address;

/// Rules of the ledger itself, independent of how it is hosted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Identities registered as admins when the ledger is created.
    #[serde(default)]
    pub bootstrap_admins: Vec<Address>,
    /// Distinct institutions needed before a company counts as verified.
    #[serde(default = "default_attestation_threshold")]
    pub attestation_threshold: u64,
    /// Reputation points a company earns per distinct attestation.
    #[serde(default = "default_points_per_attestation")]
    pub points_per_attestation: u64,
    /// Capacity of the live event subscription channel.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
    /// Recent events kept in memory for polling.
    #[serde(default = "default_event_retention")]
    pub event_retention: usize,
}

fn default_attestation_threshold() -> u64 {
    2
}
fn default_points_per_attestation() -> u64 {
    50
}
fn default_event_capacity() -> usize {
    256
}
fn default_event_retention() -> usize {
    4096
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            bootstrap_admins: Vec::new(),
            attestation_threshold: default_attestation_threshold(),
            points_per_attestation: default_points_per_attestation(),
            event_capacity: default_event_capacity(),
            event_retention: default_event_retention(),
        }
    }
}

impl LedgerConfig {
    /// Config with the given bootstrap admins and default rules.
    pub fn with_admins(admins: impl IntoIterator<Item = Address>) -> Self {
        Self {
            bootstrap_admins: admins.into_iter().collect(),
            ..Default::default()
        }
    }

    /// Reject configurations the ledger can't run with.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.attestation_threshold == 0 {
            return Err(CoreError::InvalidConfig(
                "attestation_threshold must be at least 1".into(),
            ));
        }
        if self.event_capacity == 0 {
            return Err(CoreError::InvalidConfig(
                "event_capacity must be at least 1".into(),
            ));
        }
        if self.event_retention == 0 {
            return Err(CoreError::InvalidConfig(
                "event_retention must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
