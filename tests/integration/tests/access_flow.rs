//! Integration test: the issue → publish → request → grant flow across
//! accredit-ledger and accredit-crypto.

use accredit_core::{Digest, LedgerEvent};
use accredit_crypto::{verify_membership, AccessTree};
use accredit_integration_tests::{bootstrap_ledger, identity, ledger_with_credential};
use accredit_ledger::error::{CANT_ACCESS_CREDENTIAL, INVALID_ACCESS_RIGHTS, NOT_ADMIN};
use accredit_ledger::{GrantRequest, LedgerError};

#[test]
fn test_full_access_scenario() {
    let (mut ledger, id) = ledger_with_credential();
    let owner = identity(2);
    let reader = identity(4);

    assert_eq!(id.as_u64(), 0);
    assert_eq!(ledger.credential_owned(&owner, id).unwrap(), "abcde");

    // Owner publishes {reader}
    let tree = AccessTree::from_members(&[reader]).unwrap();
    ledger.update_access_list(&owner, id, tree.root()).unwrap();
    assert_eq!(ledger.access_root(id).unwrap(), tree.root());

    // Reader asks, owner answers with a proof against the carried root
    let request = ledger.request_access(&reader, id).unwrap();
    assert_eq!(request.access_root, tree.root());

    let proof = tree.prove(&reader).unwrap();
    let grant = GrantRequest {
        credential_id: id,
        verifier: reader,
        proof_is_valid: verify_membership(&reader, &proof, &request.access_root),
        proof,
    };
    ledger.grant_access(&owner, &grant).unwrap();

    let granted = ledger
        .events_since(0)
        .iter()
        .any(|r| matches!(r.event, LedgerEvent::AccessGranted { verifier, .. } if verifier == reader));
    assert!(granted);
}

#[test]
fn test_outsider_is_denied() {
    let (mut ledger, id) = ledger_with_credential();
    let owner = identity(2);
    let outsider = identity(3);

    let tree = AccessTree::from_members(&[identity(4)]).unwrap();
    ledger.update_access_list(&owner, id, tree.root()).unwrap();
    ledger.request_access(&outsider, id).unwrap();

    // The owner can't build a proof for the outsider; reuse the reader's
    let proof = tree.prove(&identity(4)).unwrap();
    let grant = GrantRequest {
        credential_id: id,
        verifier: outsider,
        proof_is_valid: verify_membership(&outsider, &proof, &tree.root()),
        proof,
    };
    assert!(!grant.proof_is_valid);

    let before = ledger.next_event_seq();
    let err = ledger.grant_access(&owner, &grant).unwrap_err();
    assert_eq!(err, LedgerError::AccessDenied(INVALID_ACCESS_RIGHTS.into()));
    assert_eq!(ledger.next_event_seq(), before);
}

#[test]
fn test_claimed_valid_proof_rechecked() {
    let (mut ledger, id) = ledger_with_credential();
    let owner = identity(2);
    let tree = AccessTree::from_members(&[identity(4)]).unwrap();
    ledger.update_access_list(&owner, id, tree.root()).unwrap();

    let grant = GrantRequest {
        credential_id: id,
        verifier: identity(3),
        proof_is_valid: true,
        proof: tree.prove(&identity(4)).unwrap(),
    };
    assert!(matches!(
        ledger.grant_access(&owner, &grant),
        Err(LedgerError::AccessDenied(_))
    ));
}

#[test]
fn test_grant_before_any_root_is_denied() {
    let (mut ledger, id) = ledger_with_credential();
    let tree = AccessTree::from_members(&[identity(4)]).unwrap();
    assert_eq!(ledger.access_root(id).unwrap(), Digest::ZERO);

    let grant = GrantRequest {
        credential_id: id,
        verifier: identity(4),
        proof_is_valid: true,
        proof: tree.prove(&identity(4)).unwrap(),
    };
    assert!(matches!(
        ledger.grant_access(&identity(2), &grant),
        Err(LedgerError::AccessDenied(_))
    ));
}

#[test]
fn test_stale_proof_after_root_rotation() {
    let (mut ledger, id) = ledger_with_credential();
    let owner = identity(2);

    let old = AccessTree::from_members(&[identity(4), identity(5)]).unwrap();
    ledger.update_access_list(&owner, id, old.root()).unwrap();
    let proof = old.prove(&identity(5)).unwrap();

    let new = AccessTree::from_members(&[identity(4)]).unwrap();
    ledger.update_access_list(&owner, id, new.root()).unwrap();

    let grant = GrantRequest {
        credential_id: id,
        verifier: identity(5),
        proof_is_valid: true,
        proof,
    };
    assert!(ledger.grant_access(&owner, &grant).is_err());
}

#[test]
fn test_only_owner_touches_credential() {
    let (mut ledger, id) = ledger_with_credential();
    let stranger = identity(9);
    let tree = AccessTree::from_members(&[stranger]).unwrap();

    assert_eq!(
        ledger.credential_owned(&stranger, id).unwrap_err(),
        LedgerError::Unauthorized(CANT_ACCESS_CREDENTIAL.into())
    );
    assert!(matches!(
        ledger.update_access_list(&stranger, id, tree.root()),
        Err(LedgerError::Unauthorized(_))
    ));
    // Issuer doesn't get read access either
    assert!(ledger.credential_owned(&identity(1), id).is_err());
}

#[test]
fn test_unlisted_identity_cannot_issue_or_list() {
    let mut ledger = bootstrap_ledger();
    assert!(matches!(
        ledger.issue_credential(&identity(7), identity(2), "p".into()),
        Err(LedgerError::Unauthorized(_))
    ));
    assert_eq!(
        ledger.add_admin(&identity(7), identity(8)).unwrap_err(),
        LedgerError::Unauthorized(NOT_ADMIN.into())
    );
    assert_eq!(ledger.credential_count(), 0);
}

#[test]
fn test_ids_are_sequential() {
    let (mut ledger, first) = ledger_with_credential();
    let second = ledger
        .issue_credential(&identity(1), identity(3), "fghij".into())
        .unwrap();
    assert_eq!(first.as_u64(), 0);
    assert_eq!(second.as_u64(), 1);
    assert_eq!(ledger.credentials_of(&identity(3)), vec![second]);
}
