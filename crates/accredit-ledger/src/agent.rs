//! The credential owner's off-ledger side of the access exchange.
//!
//! The ledger only ever sees access roots. [`OwnerAgent`] keeps the actual
//! reader sets, publishes their roots, watches for `AccessRequested`
//! events and answers them with membership proofs.

use std::collections::{BTreeMap, HashMap};

use accredit_core::{
    Address, CoreError, CredentialId, Digest, LedgerEvent, VerificationEvent, VerificationState,
    VerificationStateMachine,
};
use accredit_crypto::{verify_membership, AccessTree};

use crate::error::{AgentError, LedgerError};
use crate::ledger::Ledger;
use crate::verification::{AccessRequest, GrantRequest};

/// Reader sets and exchange state for one owner identity.
pub struct OwnerAgent {
    owner: Address,
    trees: BTreeMap<CredentialId, AccessTree>,
    exchanges: HashMap<(CredentialId, Address), VerificationState>,
    /// Next event sequence number to read from the ledger.
    cursor: u64,
}

impl OwnerAgent {
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            trees: BTreeMap::new(),
            exchanges: HashMap::new(),
            cursor: 0,
        }
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    /// Current readers of a credential, in leaf order.
    pub fn readers(&self, id: CredentialId) -> &[Address] {
        self.trees
            .get(&id)
            .map(|tree| tree.members())
            .unwrap_or(&[])
    }

    /// Replace the reader set of a credential and publish the new root.
    pub fn set_readers(
        &mut self,
        ledger: &mut Ledger,
        id: CredentialId,
        readers: &[Address],
    ) -> Result<Digest, AgentError> {
        if ledger.credential_owner(id)? != self.owner {
            return Err(AgentError::NotOwned(id));
        }
        let tree = AccessTree::from_members(readers)?;
        let root = tree.root();
        ledger.update_access_list(&self.owner, id, root)?;

        tracing::info!(
            owner = %self.owner,
            credential_id = %id,
            readers = tree.len(),
            root = %root,
            "reader set published"
        );
        self.trees.insert(id, tree);
        Ok(root)
    }

    /// Add a reader and publish the new root.
    pub fn authorize(
        &mut self,
        ledger: &mut Ledger,
        id: CredentialId,
        reader: Address,
    ) -> Result<Digest, AgentError> {
        let mut readers = self.readers(id).to_vec();
        readers.push(reader);
        self.set_readers(ledger, id, &readers)
    }

    /// Remove a reader and publish the new root. Revoking the last reader
    /// leaves the owner as the only member.
    pub fn revoke(
        &mut self,
        ledger: &mut Ledger,
        id: CredentialId,
        reader: &Address,
    ) -> Result<Digest, AgentError> {
        let mut readers: Vec<Address> = self
            .readers(id)
            .iter()
            .filter(|r| *r != reader)
            .copied()
            .collect();
        if readers.is_empty() {
            readers.push(self.owner);
        }
        self.set_readers(ledger, id, &readers)
    }

    /// State of the exchange with `verifier` over credential `id`.
    pub fn state(&self, id: CredentialId, verifier: &Address) -> VerificationState {
        self.exchanges
            .get(&(id, *verifier))
            .copied()
            .unwrap_or(VerificationState::Idle)
    }

    /// Feed a ledger event. Returns the request to answer when the event is
    /// an access request for one of this owner's credentials.
    pub fn observe(&mut self, event: &LedgerEvent) -> Result<Option<AccessRequest>, AgentError> {
        let LedgerEvent::AccessRequested {
            credential_id,
            verifier,
            access_root,
        } = event
        else {
            return Ok(None);
        };
        if !self.trees.contains_key(credential_id) {
            return Ok(None);
        }

        self.advance(*credential_id, *verifier, VerificationEvent::Request)?;
        Ok(Some(AccessRequest {
            credential_id: *credential_id,
            verifier: *verifier,
            access_root: *access_root,
        }))
    }

    /// Answer an observed request.
    ///
    /// The proof is first checked locally against the root carried by the
    /// request; a verifier outside the reader set is denied without touching
    /// the ledger. Otherwise the grant goes to the ledger, which checks the
    /// proof again against the current root.
    pub fn respond(
        &mut self,
        ledger: &mut Ledger,
        request: &AccessRequest,
    ) -> Result<VerificationState, AgentError> {
        let id = request.credential_id;
        let verifier = request.verifier;

        let current = self.state(id, &verifier);
        if !VerificationStateMachine::can_transition(current, VerificationEvent::Grant) {
            return Err(CoreError::InvalidStateTransition {
                from: current,
                to: VerificationState::Granted,
            }
            .into());
        }

        let proof = self
            .trees
            .get(&id)
            .ok_or(AgentError::NotOwned(id))?
            .prove(&verifier);
        let proof = match proof {
            Ok(proof) => proof,
            Err(_) => {
                tracing::info!(credential_id = %id, verifier = %verifier, "verifier not a reader");
                return self.advance(id, verifier, VerificationEvent::Deny);
            }
        };

        let grant = GrantRequest {
            credential_id: id,
            verifier,
            proof_is_valid: verify_membership(&verifier, &proof, &request.access_root),
            proof,
        };
        match ledger.grant_access(&self.owner, &grant) {
            Ok(()) => self.advance(id, verifier, VerificationEvent::Grant),
            Err(LedgerError::AccessDenied(_)) => self.advance(id, verifier, VerificationEvent::Deny),
            Err(e) => Err(e.into()),
        }
    }

    /// Read new ledger events and answer pending requests. Only the latest
    /// request per verifier and credential is answered.
    ///
    /// The cursor moves past the batch only once every request in it has
    /// been answered; a failed sync sees the same requests again next time.
    pub fn sync(
        &mut self,
        ledger: &mut Ledger,
    ) -> Result<Vec<(AccessRequest, VerificationState)>, AgentError> {
        let records = ledger.events_since(self.cursor).to_vec();
        let Some(last) = records.last() else {
            return Ok(Vec::new());
        };
        let next_cursor = last.seq + 1;

        let mut latest: BTreeMap<(CredentialId, Address), AccessRequest> = BTreeMap::new();
        for record in &records {
            if let Some(request) = self.observe(&record.event)? {
                latest.insert((request.credential_id, request.verifier), request);
            }
        }

        let mut answered = Vec::with_capacity(latest.len());
        for request in latest.into_values() {
            let state = self.respond(ledger, &request)?;
            answered.push((request, state));
        }
        self.cursor = next_cursor;
        Ok(answered)
    }

    fn advance(
        &mut self,
        id: CredentialId,
        verifier: Address,
        event: VerificationEvent,
    ) -> Result<VerificationState, AgentError> {
        let current = self.state(id, &verifier);
        let next = VerificationStateMachine::transition(current, event)?;
        self.exchanges.insert((id, verifier), next);
        Ok(next)
    }
}
