use serde::{Deserialize, Serialize};

use accredit_core::{Address, CredentialId, Digest};
use accredit_crypto::{verify_membership, InclusionProof};

use crate::access::AccessControlLedger;
use crate::credentials::CredentialStore;
use crate::error::LedgerError;

/// A verifier's announced interest in a credential, as emitted on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRequest {
    pub credential_id: CredentialId,
    pub verifier: Address,
    /// Root in force when the request was made.
    pub access_root: Digest,
}

/// The owner's answer to an access request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantRequest {
    pub credential_id: CredentialId,
    pub verifier: Address,
    /// The owner's own verdict from checking the proof locally.
    pub proof_is_valid: bool,
    /// Membership proof for the verifier's leaf.
    pub proof: InclusionProof,
}

/// Request/grant exchange between verifiers and credential owners.
///
/// The owner's `proof_is_valid` flag is necessary but never sufficient:
/// the proof is always re-checked against the credential's current root.
pub struct VerificationProtocol;

impl VerificationProtocol {
    /// Record a verifier's interest. Anyone may request; nothing is granted.
    pub fn request(
        store: &CredentialStore,
        access: &AccessControlLedger,
        verifier: Address,
        credential_id: CredentialId,
    ) -> Result<AccessRequest, LedgerError> {
        store.get(credential_id)?;
        Ok(AccessRequest {
            credential_id,
            verifier,
            access_root: access.root(credential_id),
        })
    }

    /// Check an owner's grant.
    ///
    /// Order of checks: the credential exists, the caller owns it, then the
    /// membership evidence holds against the current root.
    pub fn grant(
        store: &CredentialStore,
        access: &AccessControlLedger,
        caller: &Address,
        grant: &GrantRequest,
    ) -> Result<(), LedgerError> {
        store.require_owner(grant.credential_id, caller)?;

        let root = access.root(grant.credential_id);
        if root.is_zero() || !grant.proof_is_valid {
            return Err(LedgerError::access_denied());
        }
        if grant.proof.validate().is_err() {
            return Err(LedgerError::access_denied());
        }
        if !verify_membership(&grant.verifier, &grant.proof, &root) {
            return Err(LedgerError::access_denied());
        }
        Ok(())
    }
}
