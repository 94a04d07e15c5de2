use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use accredit_core::Address;

use crate::error::{LedgerError, NOT_ADMIN, NOT_VERIFIED_INSTITUTION};

/// An institution entry. Institutions are never removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstitutionRecord {
    pub verified: bool,
    /// Admin or institution that listed it.
    pub listed_by: Address,
    pub listed_at: DateTime<Utc>,
}

/// Admin and institution membership.
///
/// Both sets are append-only. Admins are created by bootstrap or by another
/// admin; institutions by an admin or an already verified institution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleRegistry {
    admins: BTreeSet<Address>,
    institutions: BTreeMap<Address, InstitutionRecord>,
}

impl RoleRegistry {
    /// Create a registry seeded with bootstrap admins.
    pub fn new(bootstrap_admins: impl IntoIterator<Item = Address>) -> Self {
        Self {
            admins: bootstrap_admins.into_iter().collect(),
            institutions: BTreeMap::new(),
        }
    }

    /// Seed additional bootstrap admins (used when restoring state).
    pub(crate) fn bootstrap(&mut self, admins: impl IntoIterator<Item = Address>) {
        self.admins.extend(admins);
    }

    pub fn is_admin(&self, identity: &Address) -> bool {
        self.admins.contains(identity)
    }

    /// Whether `identity` is a verified institution. Unknown identities are not.
    pub fn institution_status(&self, identity: &Address) -> bool {
        self.institutions
            .get(identity)
            .is_some_and(|record| record.verified)
    }

    pub fn institution(&self, identity: &Address) -> Option<&InstitutionRecord> {
        self.institutions.get(identity)
    }

    pub fn admins(&self) -> impl Iterator<Item = &Address> {
        self.admins.iter()
    }

    pub fn admin_count(&self) -> usize {
        self.admins.len()
    }

    pub fn institution_count(&self) -> usize {
        self.institutions.len()
    }

    pub fn require_admin(&self, caller: &Address) -> Result<(), LedgerError> {
        if self.is_admin(caller) {
            Ok(())
        } else {
            Err(LedgerError::unauthorized(NOT_ADMIN))
        }
    }

    pub fn require_verified_institution(&self, caller: &Address) -> Result<(), LedgerError> {
        if self.institution_status(caller) {
            Ok(())
        } else {
            Err(LedgerError::unauthorized(NOT_VERIFIED_INSTITUTION))
        }
    }

    /// Register `admin`. Returns `false` if it already was one.
    pub fn add_admin(&mut self, caller: &Address, admin: Address) -> Result<bool, LedgerError> {
        self.require_admin(caller)?;
        Ok(self.admins.insert(admin))
    }

    /// List `institution` as verified. Returns `false` if it already was listed;
    /// the original listing record is kept.
    pub fn add_institution(
        &mut self,
        caller: &Address,
        institution: Address,
    ) -> Result<bool, LedgerError> {
        if !self.is_admin(caller) && !self.institution_status(caller) {
            return Err(LedgerError::unauthorized(NOT_ADMIN));
        }

        if self.institution_status(&institution) {
            return Ok(false);
        }
        self.institutions.insert(
            institution,
            InstitutionRecord {
                verified: true,
                listed_by: *caller,
                listed_at: Utc::now(),
            },
        );
        Ok(true)
    }
}
