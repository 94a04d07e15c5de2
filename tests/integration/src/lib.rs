//! Fixtures shared by the cross-crate scenarios in `tests/`.

use accredit_core::{Address, CredentialId, LedgerConfig};
use accredit_ledger::Ledger;

/// Deterministic identity `n`: twenty bytes, the last one set to `n`.
pub fn identity(n: u8) -> Address {
    let mut bytes = [0u8; 20];
    bytes[19] = n;
    Address::from_bytes(bytes)
}

/// A ledger bootstrapped with `identity(0)` as its only admin.
pub fn bootstrap_ledger() -> Ledger {
    Ledger::new(LedgerConfig::with_admins([identity(0)]))
}

/// Identity 0 lists identity 1 as an institution, which issues credential 0
/// to identity 2 with pointer "abcde".
pub fn ledger_with_credential() -> (Ledger, CredentialId) {
    let mut ledger = bootstrap_ledger();
    ledger
        .add_institution(&identity(0), identity(1))
        .expect("admin lists institution");
    let id = ledger
        .issue_credential(&identity(1), identity(2), "abcde".into())
        .expect("institution issues");
    (ledger, id)
}

/// List `institutions` as verified, with `identity(0)` acting as admin.
pub fn list_institutions(ledger: &mut Ledger, institutions: &[Address]) {
    for institution in institutions {
        ledger
            .add_institution(&identity(0), *institution)
            .expect("admin lists institution");
    }
}
