use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use accredit_core::{Address, CredentialId, Digest, EventRecord, LedgerConfig, LedgerEvent};

use crate::access::AccessControlLedger;
use crate::attestation::{AttestationOutcome, AttestationRegistry, CompanyRecord};
use crate::credentials::{CredentialRecord, CredentialStore, IssuerKind};
use crate::error::{LedgerError, NOT_VERIFIED_COMPANY, NOT_VERIFIED_INSTITUTION};
use crate::outbox::EventOutbox;
use crate::roles::{InstitutionRecord, RoleRegistry};
use crate::verification::{AccessRequest, GrantRequest, VerificationProtocol};

/// Ledger state, without the event history.
///
/// Events are persisted separately by the host; only the sequence counter is
/// kept here so numbering survives a restart.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub roles: RoleRegistry,
    pub credentials: CredentialStore,
    pub access: AccessControlLedger,
    pub companies: AttestationRegistry,
    #[serde(default)]
    pub next_event_seq: u64,
}

/// The credential ledger.
///
/// Owns every registry and is the only way to mutate them. Each mutator
/// either commits fully and publishes exactly one event, or returns an
/// error and leaves state untouched. Callers that share a ledger must
/// serialize access to it (the node does so with a single owning task).
#[derive(Debug)]
pub struct Ledger {
    config: LedgerConfig,
    roles: RoleRegistry,
    credentials: CredentialStore,
    access: AccessControlLedger,
    companies: AttestationRegistry,
    outbox: EventOutbox,
}

fn rejected(op: &'static str, caller: &Address, err: LedgerError) -> LedgerError {
    tracing::warn!(op, caller = %caller, code = err.code(), reason = %err, "transition rejected");
    err
}

impl Ledger {
    /// Create an empty ledger with the configured bootstrap admins.
    pub fn new(config: LedgerConfig) -> Self {
        let roles = RoleRegistry::new(config.bootstrap_admins.iter().copied());
        let outbox = EventOutbox::new(config.event_capacity, config.event_retention);
        tracing::info!(
            admins = roles.admin_count(),
            threshold = config.attestation_threshold,
            "ledger created"
        );
        Self {
            config,
            roles,
            credentials: CredentialStore::new(),
            access: AccessControlLedger::new(),
            companies: AttestationRegistry::new(),
            outbox,
        }
    }

    /// Restore a ledger from a snapshot. Bootstrap admins from `config` are
    /// merged into the restored admin set.
    pub fn from_snapshot(config: LedgerConfig, snapshot: LedgerSnapshot) -> Result<Self, LedgerError> {
        snapshot.credentials.check_dense()?;
        snapshot.access.check_against(&snapshot.credentials)?;

        let mut roles = snapshot.roles;
        roles.bootstrap(config.bootstrap_admins.iter().copied());
        let outbox = EventOutbox::restore(
            Vec::new(),
            snapshot.next_event_seq,
            config.event_capacity,
            config.event_retention,
        );

        tracing::info!(
            admins = roles.admin_count(),
            institutions = roles.institution_count(),
            credentials = snapshot.credentials.len(),
            companies = snapshot.companies.len(),
            next_event_seq = outbox.next_seq(),
            "ledger restored"
        );

        Ok(Self {
            config,
            roles,
            credentials: snapshot.credentials,
            access: snapshot.access,
            companies: snapshot.companies,
            outbox,
        })
    }

    /// Reload the recent event history, e.g. from the host's event log.
    /// The sequence counter never moves backwards.
    pub fn with_events(mut self, records: Vec<EventRecord>) -> Self {
        self.outbox = EventOutbox::restore(
            records,
            self.outbox.next_seq(),
            self.config.event_capacity,
            self.config.event_retention,
        );
        self
    }

    /// Copy of the persistent state.
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            roles: self.roles.clone(),
            credentials: self.credentials.clone(),
            access: self.access.clone(),
            companies: self.companies.clone(),
            next_event_seq: self.outbox.next_seq(),
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    // ---- Roles ----

    /// Register a new admin. Caller must be an admin.
    pub fn add_admin(&mut self, caller: &Address, admin: Address) -> Result<(), LedgerError> {
        let added = self
            .roles
            .add_admin(caller, admin)
            .map_err(|e| rejected("add_admin", caller, e))?;

        tracing::info!(caller = %caller, admin = %admin, new = added, "admin added");
        self.outbox.publish(LedgerEvent::AdminAdded {
            admin,
            added_by: *caller,
        });
        Ok(())
    }

    /// List a verified institution. Caller must be an admin or a verified
    /// institution.
    pub fn add_institution(&mut self, caller: &Address, institution: Address) -> Result<(), LedgerError> {
        let added = self
            .roles
            .add_institution(caller, institution)
            .map_err(|e| rejected("add_institution", caller, e))?;

        tracing::info!(caller = %caller, institution = %institution, new = added, "institution listed");
        self.outbox.publish(LedgerEvent::InstitutionListed {
            institution,
            listed_by: *caller,
        });
        Ok(())
    }

    pub fn is_admin(&self, identity: &Address) -> bool {
        self.roles.is_admin(identity)
    }

    pub fn institution_status(&self, identity: &Address) -> bool {
        self.roles.institution_status(identity)
    }

    pub fn institution(&self, identity: &Address) -> Option<&InstitutionRecord> {
        self.roles.institution(identity)
    }

    pub fn company_status(&self, identity: &Address) -> bool {
        self.companies.is_verified(identity)
    }

    pub fn admin_count(&self) -> usize {
        self.roles.admin_count()
    }

    pub fn institution_count(&self) -> usize {
        self.roles.institution_count()
    }

    pub fn company_count(&self) -> usize {
        self.companies.len()
    }

    // ---- Credentials ----

    /// Issue a credential to `owner`. The caller must be a verified
    /// institution or a verified company at call time.
    pub fn issue_credential(
        &mut self,
        caller: &Address,
        owner: Address,
        pointer: String,
    ) -> Result<CredentialId, LedgerError> {
        let kind = if self.roles.institution_status(caller) {
            IssuerKind::Institution
        } else if self.companies.is_verified(caller) {
            IssuerKind::Company
        } else {
            return Err(rejected(
                "issue_credential",
                caller,
                LedgerError::unauthorized(NOT_VERIFIED_INSTITUTION),
            ));
        };
        self.commit_issue("issue_credential", caller, kind, owner, pointer)
    }

    /// Issue on behalf of a verified institution only.
    pub fn issue_institution_credential(
        &mut self,
        caller: &Address,
        owner: Address,
        pointer: String,
    ) -> Result<CredentialId, LedgerError> {
        self.roles
            .require_verified_institution(caller)
            .map_err(|e| rejected("issue_institution_credential", caller, e))?;
        self.commit_issue(
            "issue_institution_credential",
            caller,
            IssuerKind::Institution,
            owner,
            pointer,
        )
    }

    /// Issue on behalf of a verified company only.
    pub fn issue_company_credential(
        &mut self,
        caller: &Address,
        owner: Address,
        pointer: String,
    ) -> Result<CredentialId, LedgerError> {
        if !self.companies.is_verified(caller) {
            return Err(rejected(
                "issue_company_credential",
                caller,
                LedgerError::unauthorized(NOT_VERIFIED_COMPANY),
            ));
        }
        self.commit_issue(
            "issue_company_credential",
            caller,
            IssuerKind::Company,
            owner,
            pointer,
        )
    }

    fn commit_issue(
        &mut self,
        op: &'static str,
        caller: &Address,
        kind: IssuerKind,
        owner: Address,
        pointer: String,
    ) -> Result<CredentialId, LedgerError> {
        let id = self
            .credentials
            .issue(*caller, kind, owner, pointer)
            .map_err(|e| rejected(op, caller, e))?;

        tracing::info!(
            issuer = %caller,
            issuer_kind = %kind,
            owner = %owner,
            credential_id = %id,
            "credential issued"
        );
        self.outbox.publish(LedgerEvent::CredentialIssued {
            credential_id: id,
            owner,
            issuer: *caller,
        });
        Ok(id)
    }

    /// The credential pointer. Only the owner may read it.
    pub fn credential_owned(&self, caller: &Address, id: CredentialId) -> Result<String, LedgerError> {
        self.credentials
            .pointer_for_owner(id, caller)
            .map(str::to_string)
            .map_err(|e| rejected("credential_owned", caller, e))
    }

    pub fn credential_owner(&self, id: CredentialId) -> Result<Address, LedgerError> {
        self.credentials.get(id).map(|record| record.owner)
    }

    /// Full record, for the owner only.
    pub fn credential(&self, caller: &Address, id: CredentialId) -> Result<&CredentialRecord, LedgerError> {
        self.credentials.require_owner(id, caller)
    }

    /// Credentials owned by `owner`, in id order.
    pub fn credentials_of(&self, owner: &Address) -> Vec<CredentialId> {
        self.credentials.owned_by(owner).map(|r| r.id).collect()
    }

    pub fn credential_count(&self) -> usize {
        self.credentials.len()
    }

    // ---- Access ----

    /// Publish a new access root. Caller must own the credential.
    pub fn update_access_list(
        &mut self,
        caller: &Address,
        id: CredentialId,
        root: Digest,
    ) -> Result<(), LedgerError> {
        let previous = self
            .access
            .update(&self.credentials, caller, id, root)
            .map_err(|e| rejected("update_access_list", caller, e))?;

        tracing::info!(
            credential_id = %id,
            root = %root,
            previous = %previous,
            "access root updated"
        );
        self.outbox.publish(LedgerEvent::AccessUpdated {
            credential_id: id,
            access_root: root,
        });
        Ok(())
    }

    /// Current access root (zero if never published).
    pub fn access_root(&self, id: CredentialId) -> Result<Digest, LedgerError> {
        self.credentials.get(id)?;
        Ok(self.access.root(id))
    }

    /// Announce that `caller` wants to read credential `id`.
    pub fn request_access(&mut self, caller: &Address, id: CredentialId) -> Result<AccessRequest, LedgerError> {
        let request = VerificationProtocol::request(&self.credentials, &self.access, *caller, id)
            .map_err(|e| rejected("request_access", caller, e))?;

        tracing::info!(
            credential_id = %id,
            verifier = %caller,
            root = %request.access_root,
            "access requested"
        );
        self.outbox.publish(LedgerEvent::AccessRequested {
            credential_id: id,
            verifier: *caller,
            access_root: request.access_root,
        });
        Ok(request)
    }

    /// Accept the owner's grant if the proof holds against the current root.
    pub fn grant_access(&mut self, caller: &Address, grant: &GrantRequest) -> Result<(), LedgerError> {
        VerificationProtocol::grant(&self.credentials, &self.access, caller, grant)
            .map_err(|e| rejected("grant_access", caller, e))?;

        tracing::info!(
            credential_id = %grant.credential_id,
            verifier = %grant.verifier,
            "access granted"
        );
        self.outbox.publish(LedgerEvent::AccessGranted {
            credential_id: grant.credential_id,
            verifier: grant.verifier,
        });
        Ok(())
    }

    // ---- Companies ----

    /// Attest `company`. Caller must be a verified institution.
    pub fn add_company(&mut self, caller: &Address, company: Address) -> Result<AttestationOutcome, LedgerError> {
        self.roles
            .require_verified_institution(caller)
            .map_err(|e| rejected("add_company", caller, e))?;
        let outcome = self
            .companies
            .attest(*caller, company, self.config.attestation_threshold)
            .map_err(|e| rejected("add_company", caller, e))?;

        let event = match outcome {
            AttestationOutcome::Listed { verified } => {
                tracing::info!(company = %company, institution = %caller, verified, "company listed");
                LedgerEvent::CompanyListed {
                    company,
                    listed_by: *caller,
                }
            }
            AttestationOutcome::Attested {
                attestations,
                newly_verified,
            } => {
                tracing::info!(
                    company = %company,
                    institution = %caller,
                    attestations,
                    newly_verified,
                    "company attested"
                );
                LedgerEvent::CompanyAttested {
                    company,
                    attested_by: *caller,
                    attestations,
                }
            }
        };
        self.outbox.publish(event);
        Ok(outcome)
    }

    /// Reputation score of a company; zero for unknown identities.
    pub fn company_stats(&self, company: &Address) -> u64 {
        self.companies
            .score(company, self.config.points_per_attestation)
    }

    pub fn company(&self, company: &Address) -> Option<&CompanyRecord> {
        self.companies.company(company)
    }

    // ---- Events ----

    pub fn events_since(&self, seq: u64) -> &[EventRecord] {
        self.outbox.since(seq)
    }

    pub fn next_event_seq(&self) -> u64 {
        self.outbox.next_seq()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventRecord> {
        self.outbox.subscribe()
    }
}
