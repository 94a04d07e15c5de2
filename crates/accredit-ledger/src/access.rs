use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use accredit_core::{Address, CredentialId, Digest};

use crate::credentials::CredentialStore;
use crate::error::LedgerError;

/// Current access root of every credential.
///
/// A credential without an entry has the zero root: nobody has been
/// authorized yet. The root is the only thing the ledger knows about the
/// reader set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessControlLedger {
    roots: BTreeMap<CredentialId, Digest>,
}

impl AccessControlLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current root for `id` (zero when never set).
    pub fn root(&self, id: CredentialId) -> Digest {
        self.roots.get(&id).copied().unwrap_or(Digest::ZERO)
    }

    /// Replace the access root of a credential the caller owns.
    /// Returns the root that was replaced.
    pub fn update(
        &mut self,
        store: &CredentialStore,
        caller: &Address,
        id: CredentialId,
        new_root: Digest,
    ) -> Result<Digest, LedgerError> {
        store.require_owner(id, caller)?;
        if new_root.is_zero() {
            return Err(LedgerError::InvalidInput(
                "access root must not be the zero digest".into(),
            ));
        }
        Ok(self.roots.insert(id, new_root).unwrap_or(Digest::ZERO))
    }

    /// Number of credentials with a published root.
    pub fn published(&self) -> usize {
        self.roots.len()
    }

    /// Check every root refers to an existing credential.
    pub(crate) fn check_against(&self, store: &CredentialStore) -> Result<(), LedgerError> {
        for id in self.roots.keys() {
            store.get(*id)?;
        }
        Ok(())
    }
}
