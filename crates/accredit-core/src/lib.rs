//! Accredit Core: Identity and digest types, ledger events, errors, and
//! configuration shared by every layer of the Accredit credential ledger.

pub mod config;
pub mod error;
pub mod events;
pub mod types;
pub mod verification_state;

pub use config::LedgerConfig;
pub use error::CoreError;
pub use events::{EventRecord, LedgerEvent};
pub use types::{Address, CredentialId, Digest, ADDRESS_LEN, DIGEST_LEN};
pub use verification_state::{VerificationEvent, VerificationState, VerificationStateMachine};
