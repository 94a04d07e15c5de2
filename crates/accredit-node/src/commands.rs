//! Commands dispatched from the HTTP API to the ledger task.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::oneshot;

use accredit_core::{Address, CredentialId, Digest, EventRecord};
use accredit_ledger::{AccessRequest, GrantRequest, IssuerKind, LedgerError};

/// Reply channel for a ledger command.
pub type Reply<T> = oneshot::Sender<Result<T, LedgerError>>;

/// A command sent from the HTTP API to the task owning the ledger.
pub enum LedgerCommand {
    AddAdmin {
        caller: Address,
        admin: Address,
        reply: Reply<RoleResponse>,
    },
    AddInstitution {
        caller: Address,
        institution: Address,
        reply: Reply<RoleResponse>,
    },
    InstitutionStatus {
        institution: Address,
        reply: Reply<InstitutionStatusResponse>,
    },
    /// `kind` picks a specific issuance path; `None` accepts either role.
    IssueCredential {
        caller: Address,
        owner: Address,
        pointer: String,
        kind: Option<IssuerKind>,
        reply: Reply<IssuedResponse>,
    },
    GetCredential {
        caller: Address,
        credential_id: CredentialId,
        reply: Reply<CredentialResponse>,
    },
    GetAccessRoot {
        credential_id: CredentialId,
        reply: Reply<AccessRootResponse>,
    },
    UpdateAccess {
        caller: Address,
        credential_id: CredentialId,
        access_root: Digest,
        reply: Reply<AccessRootResponse>,
    },
    RequestAccess {
        caller: Address,
        credential_id: CredentialId,
        reply: Reply<AccessRequest>,
    },
    GrantAccess {
        caller: Address,
        grant: GrantRequest,
        reply: Reply<GrantResponse>,
    },
    AddCompany {
        caller: Address,
        company: Address,
        reply: Reply<CompanyResponse>,
    },
    CompanyStats {
        company: Address,
        reply: Reply<CompanyResponse>,
    },
    Events {
        since: u64,
        reply: Reply<EventsResponse>,
    },
    Status {
        reply: Reply<LedgerStatus>,
    },
}

impl LedgerCommand {
    /// Whether a successful run of this command changes persisted ledger
    /// state. Access requests and grants only publish events.
    pub fn changes_state(&self) -> bool {
        matches!(
            self,
            Self::AddAdmin { .. }
                | Self::AddInstitution { .. }
                | Self::IssueCredential { .. }
                | Self::UpdateAccess { .. }
                | Self::AddCompany { .. }
        )
    }
}

/// Response after registering an admin or institution.
#[derive(Debug, Clone, Serialize)]
pub struct RoleResponse {
    pub address: Address,
    pub role: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InstitutionStatusResponse {
    pub address: Address,
    pub verified: bool,
    pub listed_by: Option<Address>,
    pub listed_at: Option<DateTime<Utc>>,
}

/// Response after issuing a credential.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedResponse {
    pub credential_id: CredentialId,
    pub owner: Address,
    pub issuer: Address,
    pub issuer_kind: IssuerKind,
}

/// A credential as seen by its owner.
#[derive(Debug, Clone, Serialize)]
pub struct CredentialResponse {
    pub credential_id: CredentialId,
    pub owner: Address,
    pub issuer: Address,
    pub issuer_kind: IssuerKind,
    pub pointer: String,
    pub issued_at: DateTime<Utc>,
    pub access_root: Digest,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccessRootResponse {
    pub credential_id: CredentialId,
    pub access_root: Digest,
}

#[derive(Debug, Clone, Serialize)]
pub struct GrantResponse {
    pub credential_id: CredentialId,
    pub verifier: Address,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompanyResponse {
    pub address: Address,
    pub verified: bool,
    pub attestations: u64,
    pub score: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventsResponse {
    pub events: Vec<EventRecord>,
    /// Sequence number to poll from next.
    pub next: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LedgerStatus {
    pub admins: usize,
    pub institutions: usize,
    pub credentials: usize,
    pub companies: usize,
    pub events: u64,
}
