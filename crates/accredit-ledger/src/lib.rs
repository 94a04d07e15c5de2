//! Accredit Ledger: the authorization state machine for issued credentials.
//!
//! - [`RoleRegistry`]: admins and verified institutions
//! - [`CredentialStore`]: sequentially numbered credential records
//! - [`AccessControlLedger`]: one Merkle access root per credential
//! - [`VerificationProtocol`]: request/grant exchange checked against the current root
//! - [`AttestationRegistry`]: multi-institution company attestations
//! - [`Ledger`]: the single-writer coordinator over all of the above
//! - [`OwnerAgent`]: the owner's off-ledger side of the verification exchange

pub mod access;
pub mod agent;
pub mod attestation;
pub mod credentials;
pub mod error;
pub mod ledger;
pub mod outbox;
pub mod roles;
pub mod verification;

pub use access::AccessControlLedger;
pub use agent::OwnerAgent;
pub use attestation::{AttestationOutcome, AttestationRegistry, CompanyRecord};
pub use credentials::{CredentialRecord, CredentialStore, IssuerKind};
pub use error::{AgentError, LedgerError};
pub use ledger::{Ledger, LedgerSnapshot};
pub use outbox::EventOutbox;
pub use roles::{InstitutionRecord, RoleRegistry};
pub use verification::{AccessRequest, GrantRequest, VerificationProtocol};
