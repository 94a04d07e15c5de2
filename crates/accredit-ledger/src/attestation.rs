use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use accredit_core::Address;

use crate::error::{LedgerError, ALREADY_ATTESTED};

/// A company and the institutions that vouched for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRecord {
    /// Distinct attesting institutions. Never shrinks.
    pub attesters: BTreeSet<Address>,
    pub verified: bool,
    pub listed_at: DateTime<Utc>,
}

impl CompanyRecord {
    pub fn attestation_count(&self) -> u64 {
        self.attesters.len() as u64
    }
}

/// What an accepted attestation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttestationOutcome {
    /// First attestation: the company now exists, unverified unless the
    /// threshold is 1.
    Listed { verified: bool },
    /// A further distinct institution attested.
    Attested {
        attestations: u64,
        /// The threshold was crossed by this attestation.
        newly_verified: bool,
    },
}

/// Company attestations by verified institutions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttestationRegistry {
    companies: BTreeMap<Address, CompanyRecord>,
}

impl AttestationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an attestation of `company` by `institution`. The caller has
    /// already been checked to be a verified institution.
    ///
    /// A second attestation from the same institution is a `Conflict` and
    /// changes nothing.
    pub fn attest(
        &mut self,
        institution: Address,
        company: Address,
        threshold: u64,
    ) -> Result<AttestationOutcome, LedgerError> {
        match self.companies.get_mut(&company) {
            None => {
                let verified = threshold <= 1;
                self.companies.insert(
                    company,
                    CompanyRecord {
                        attesters: BTreeSet::from([institution]),
                        verified,
                        listed_at: Utc::now(),
                    },
                );
                Ok(AttestationOutcome::Listed { verified })
            }
            Some(record) => {
                if record.attesters.contains(&institution) {
                    return Err(LedgerError::Conflict(ALREADY_ATTESTED.to_string()));
                }
                record.attesters.insert(institution);
                let attestations = record.attestation_count();
                let newly_verified = !record.verified && attestations >= threshold;
                if newly_verified {
                    record.verified = true;
                }
                Ok(AttestationOutcome::Attested {
                    attestations,
                    newly_verified,
                })
            }
        }
    }

    /// Whether `company` is verified. Unknown identities are not.
    pub fn is_verified(&self, company: &Address) -> bool {
        self.companies
            .get(company)
            .is_some_and(|record| record.verified)
    }

    /// Reputation score: attestations times `points`. Zero when unknown.
    pub fn score(&self, company: &Address, points: u64) -> u64 {
        self.companies
            .get(company)
            .map_or(0, |record| record.attestation_count().saturating_mul(points))
    }

    pub fn company(&self, company: &Address) -> Option<&CompanyRecord> {
        self.companies.get(company)
    }

    pub fn len(&self) -> usize {
        self.companies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }
}
