use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use accredit_core::{Address, CredentialId};

use crate::error::{LedgerError, CANT_ACCESS_CREDENTIAL};

/// Which role authorized an issuance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssuerKind {
    Institution,
    Company,
}

impl fmt::Display for IssuerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Institution => write!(f, "Institution"),
            Self::Company => write!(f, "Company"),
        }
    }
}

/// An issued credential. Owner, issuer and pointer never change after issuance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub id: CredentialId,
    pub owner: Address,
    pub issuer: Address,
    pub issuer_kind: IssuerKind,
    /// Opaque locator of the off-ledger credential content.
    pub pointer: String,
    pub issued_at: DateTime<Utc>,
}

/// Credential records in an arena indexed by [`CredentialId`].
///
/// Ids are the arena index, so they are dense and start at 0. Records are
/// never removed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialStore {
    records: Vec<CredentialRecord>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id the next issuance will receive.
    pub fn next_id(&self) -> CredentialId {
        CredentialId(self.records.len() as u64)
    }

    /// Store a new record. Role checks happen before this is called.
    pub fn issue(
        &mut self,
        issuer: Address,
        issuer_kind: IssuerKind,
        owner: Address,
        pointer: String,
    ) -> Result<CredentialId, LedgerError> {
        if pointer.trim().is_empty() {
            return Err(LedgerError::InvalidInput(
                "credential pointer must not be empty".into(),
            ));
        }

        let id = self.next_id();
        self.records.push(CredentialRecord {
            id,
            owner,
            issuer,
            issuer_kind,
            pointer,
            issued_at: Utc::now(),
        });
        Ok(id)
    }

    /// Look up a record. Ids past the allocated range are `NotFound`.
    pub fn get(&self, id: CredentialId) -> Result<&CredentialRecord, LedgerError> {
        id.index()
            .and_then(|index| self.records.get(index))
            .ok_or(LedgerError::NotFound(id))
    }

    /// Look up a record the caller must own.
    pub fn require_owner(
        &self,
        id: CredentialId,
        caller: &Address,
    ) -> Result<&CredentialRecord, LedgerError> {
        let record = self.get(id)?;
        if record.owner != *caller {
            return Err(LedgerError::unauthorized(CANT_ACCESS_CREDENTIAL));
        }
        Ok(record)
    }

    /// The pointer of a credential, readable only by its owner.
    pub fn pointer_for_owner(
        &self,
        id: CredentialId,
        caller: &Address,
    ) -> Result<&str, LedgerError> {
        Ok(self.require_owner(id, caller)?.pointer.as_str())
    }

    /// Credentials owned by `owner`, in id order.
    pub fn owned_by<'a>(&'a self, owner: &'a Address) -> impl Iterator<Item = &'a CredentialRecord> {
        self.records.iter().filter(move |r| r.owner == *owner)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Check that stored ids match their arena positions.
    pub(crate) fn check_dense(&self) -> Result<(), LedgerError> {
        for (index, record) in self.records.iter().enumerate() {
            if record.id.index() != Some(index) {
                return Err(LedgerError::InvalidInput(format!(
                    "credential at position {} has id {}",
                    index, record.id
                )));
            }
        }
        Ok(())
    }
}
