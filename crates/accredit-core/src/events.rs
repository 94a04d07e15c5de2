//! Notifications published by the ledger after each committed transition.
//!
//! Every event carries the identities and digests an off-ledger observer
//! needs to act on it without re-querying ledger state. In particular,
//! [`LedgerEvent::AccessRequested`] holds the access root the owner's proof
//! must be built against.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{Address, CredentialId, Digest};

/// A ledger notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LedgerEvent {
    /// A new admin was registered.
    AdminAdded { admin: Address, added_by: Address },

    /// An identity was listed as a verified institution.
    InstitutionListed {
        institution: Address,
        listed_by: Address,
    },

    /// A credential record was created.
    CredentialIssued {
        credential_id: CredentialId,
        owner: Address,
        issuer: Address,
    },

    /// The owner replaced a credential's access root.
    AccessUpdated {
        credential_id: CredentialId,
        access_root: Digest,
    },

    /// A third party asked for access to a credential.
    AccessRequested {
        credential_id: CredentialId,
        verifier: Address,
        access_root: Digest,
    },

    /// The owner granted a verifier access after the membership proof checked out.
    AccessGranted {
        credential_id: CredentialId,
        verifier: Address,
    },

    /// A company received its first attestation.
    CompanyListed { company: Address, listed_by: Address },

    /// A further distinct institution attested a company.
    CompanyAttested {
        company: Address,
        attested_by: Address,
        attestations: u64,
    },
}

impl LedgerEvent {
    /// Short event name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AdminAdded { .. } => "AdminAdded",
            Self::InstitutionListed { .. } => "InstitutionListed",
            Self::CredentialIssued { .. } => "CredentialIssued",
            Self::AccessUpdated { .. } => "AccessUpdated",
            Self::AccessRequested { .. } => "AccessRequested",
            Self::AccessGranted { .. } => "AccessGranted",
            Self::CompanyListed { .. } => "CompanyListed",
            Self::CompanyAttested { .. } => "CompanyAttested",
        }
    }

    /// The credential this event concerns, if any.
    pub fn credential_id(&self) -> Option<CredentialId> {
        match self {
            Self::CredentialIssued { credential_id, .. }
            | Self::AccessUpdated { credential_id, .. }
            | Self::AccessRequested { credential_id, .. }
            | Self::AccessGranted { credential_id, .. } => Some(*credential_id),
            _ => None,
        }
    }
}

impl fmt::Display for LedgerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdminAdded { admin, .. } => write!(f, "AdminAdded({})", admin),
            Self::InstitutionListed { institution, .. } => {
                write!(f, "InstitutionListed({})", institution)
            }
            Self::CredentialIssued {
                credential_id,
                owner,
                ..
            } => write!(f, "CredentialIssued({}, {})", credential_id, owner),
            Self::AccessUpdated {
                credential_id,
                access_root,
            } => write!(f, "AccessUpdated({}, {})", credential_id, access_root),
            Self::AccessRequested {
                credential_id,
                verifier,
                access_root,
            } => write!(
                f,
                "AccessRequested({}, {}, {})",
                credential_id, verifier, access_root
            ),
            Self::AccessGranted {
                credential_id,
                verifier,
            } => write!(f, "AccessGranted({}, {})", credential_id, verifier),
            Self::CompanyListed { company, .. } => write!(f, "CompanyListed({})", company),
            Self::CompanyAttested {
                company,
                attestations,
                ..
            } => write!(f, "CompanyAttested({}, {})", company, attestations),
        }
    }
}

/// A sequenced event as stored in the outbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Position in the outbox, starting at 0.
    pub seq: u64,
    /// When the transition committed.
    pub at: DateTime<Utc>,
    /// The event itself.
    pub event: LedgerEvent,
}
