//! Integration test: the owner agent answering requests it reads from the
//! ledger event log.

use accredit_core::VerificationState;
use accredit_integration_tests::{identity, ledger_with_credential};
use accredit_ledger::{Ledger, LedgerSnapshot, OwnerAgent};

#[test]
fn test_agent_grants_readers_and_denies_others() {
    let (mut ledger, id) = ledger_with_credential();
    let mut agent = OwnerAgent::new(identity(2));
    agent.set_readers(&mut ledger, id, &[identity(4)]).unwrap();

    ledger.request_access(&identity(4), id).unwrap();
    ledger.request_access(&identity(3), id).unwrap();

    let answered = agent.sync(&mut ledger).unwrap();
    assert_eq!(answered.len(), 2);
    assert_eq!(agent.state(id, &identity(4)), VerificationState::Granted);
    assert_eq!(agent.state(id, &identity(3)), VerificationState::Denied);

    // Nothing new to answer
    assert!(agent.sync(&mut ledger).unwrap().is_empty());
}

#[test]
fn test_revocation_blocks_later_requests() {
    let (mut ledger, id) = ledger_with_credential();
    let mut agent = OwnerAgent::new(identity(2));
    agent.set_readers(&mut ledger, id, &[identity(4), identity(5)]).unwrap();

    agent.revoke(&mut ledger, id, &identity(5)).unwrap();
    assert_eq!(agent.readers(id), &[identity(4)]);

    ledger.request_access(&identity(5), id).unwrap();
    agent.sync(&mut ledger).unwrap();
    assert_eq!(agent.state(id, &identity(5)), VerificationState::Denied);
}

#[test]
fn test_agent_refuses_foreign_credential() {
    let (mut ledger, id) = ledger_with_credential();
    let mut agent = OwnerAgent::new(identity(9));
    assert!(agent.set_readers(&mut ledger, id, &[identity(4)]).is_err());
    assert!(agent.readers(id).is_empty());
}

#[test]
fn test_snapshot_restores_access_state() {
    let (mut ledger, id) = ledger_with_credential();
    let mut agent = OwnerAgent::new(identity(2));
    let root = agent.set_readers(&mut ledger, id, &[identity(4)]).unwrap();

    let json = serde_json::to_string(&ledger.snapshot()).unwrap();
    let snapshot: LedgerSnapshot = serde_json::from_str(&json).unwrap();
    let mut restored = Ledger::from_snapshot(ledger.config().clone(), snapshot).unwrap();

    assert_eq!(restored.access_root(id).unwrap(), root);
    assert_eq!(restored.credential_owned(&identity(2), id).unwrap(), "abcde");
    assert_eq!(restored.next_event_seq(), ledger.next_event_seq());

    // A fresh agent with the same reader set keeps working on the restored ledger
    let mut agent = OwnerAgent::new(identity(2));
    agent.set_readers(&mut restored, id, &[identity(4)]).unwrap();
    restored.request_access(&identity(4), id).unwrap();
    agent.sync(&mut restored).unwrap();
    assert_eq!(agent.state(id, &identity(4)), VerificationState::Granted);
}
