//! Integration test: company attestation, reputation, and company issuance.

use accredit_core::LedgerConfig;
use accredit_integration_tests::{bootstrap_ledger, identity, list_institutions};
use accredit_ledger::error::ALREADY_ATTESTED;
use accredit_ledger::{AttestationOutcome, IssuerKind, Ledger, LedgerError};

#[test]
fn test_two_attestations_verify_company() {
    let mut ledger = bootstrap_ledger();
    let company = identity(20);
    list_institutions(&mut ledger, &[identity(1), identity(2)]);

    let first = ledger.add_company(&identity(1), company).unwrap();
    assert_eq!(first, AttestationOutcome::Listed { verified: false });
    assert!(!ledger.company_status(&company));
    assert_eq!(ledger.company_stats(&company), 50);

    let second = ledger.add_company(&identity(2), company).unwrap();
    assert_eq!(
        second,
        AttestationOutcome::Attested {
            attestations: 2,
            newly_verified: true
        }
    );
    assert!(ledger.company_status(&company));
    assert_eq!(ledger.company_stats(&company), 100);
}

#[test]
fn test_repeat_attestation_is_conflict() {
    let mut ledger = bootstrap_ledger();
    let company = identity(20);
    list_institutions(&mut ledger, &[identity(1)]);

    ledger.add_company(&identity(1), company).unwrap();
    assert_eq!(
        ledger.add_company(&identity(1), company).unwrap_err(),
        LedgerError::Conflict(ALREADY_ATTESTED.into())
    );
    assert_eq!(ledger.company_stats(&company), 50);
}

#[test]
fn test_unknown_company_scores_zero() {
    let ledger = bootstrap_ledger();
    assert_eq!(ledger.company_stats(&identity(42)), 0);
    assert!(!ledger.company_status(&identity(42)));
}

#[test]
fn test_admin_alone_cannot_attest() {
    let mut ledger = bootstrap_ledger();
    assert!(matches!(
        ledger.add_company(&identity(0), identity(20)),
        Err(LedgerError::Unauthorized(_))
    ));
    assert_eq!(ledger.company_count(), 0);
}

#[test]
fn test_verified_company_issues() {
    let mut ledger = bootstrap_ledger();
    let company = identity(20);
    list_institutions(&mut ledger, &[identity(1), identity(2)]);
    ledger.add_company(&identity(1), company).unwrap();

    // One attestation is not enough
    assert!(ledger
        .issue_company_credential(&company, identity(5), "offer".into())
        .is_err());

    ledger.add_company(&identity(2), company).unwrap();
    let id = ledger
        .issue_credential(&company, identity(5), "offer".into())
        .unwrap();
    let record = ledger.credential(&identity(5), id).unwrap();
    assert_eq!(record.issuer, company);
    assert_eq!(record.issuer_kind, IssuerKind::Company);
}

#[test]
fn test_custom_threshold_and_points() {
    let config = LedgerConfig {
        attestation_threshold: 3,
        points_per_attestation: 10,
        ..LedgerConfig::with_admins([identity(0)])
    };
    let mut ledger = Ledger::new(config);
    let company = identity(20);
    list_institutions(&mut ledger, &[identity(1), identity(2), identity(3)]);

    ledger.add_company(&identity(1), company).unwrap();
    ledger.add_company(&identity(2), company).unwrap();
    assert!(!ledger.company_status(&company));
    ledger.add_company(&identity(3), company).unwrap();
    assert!(ledger.company_status(&company));
    assert_eq!(ledger.company_stats(&company), 30);
}
