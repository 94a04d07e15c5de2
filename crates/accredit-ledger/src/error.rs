use accredit_core::CredentialId;

pub const NOT_ADMIN: &str = "Not Admin!";
pub const NOT_VERIFIED_INSTITUTION: &str = "Not a verified institution!";
pub const NOT_VERIFIED_COMPANY: &str = "Not a verified company!";
pub const CANT_ACCESS_CREDENTIAL: &str = "Can't access credential";
pub const INVALID_ACCESS_RIGHTS: &str = "Invalid Access Rights";
pub const ALREADY_ATTESTED: &str = "Already attested!";

/// Reasons a ledger transition is refused. A refused transition leaves no
/// trace in ledger state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// The caller lacks the role or ownership the operation needs.
    #[error("{0}")]
    Unauthorized(String),

    /// The owner's membership evidence doesn't hold against the current root.
    #[error("{0}")]
    AccessDenied(String),

    #[error("credential {0} not found")]
    NotFound(CredentialId),

    #[error("{0}")]
    Conflict(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Raised by the host, not the ledger: the transition could not be made
    /// durable and was not acknowledged.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Stable classification code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "Unauthorized",
            Self::AccessDenied(_) => "AccessDenied",
            Self::NotFound(_) => "NotFound",
            Self::Conflict(_) => "Conflict",
            Self::InvalidInput(_) => "InvalidInput",
            Self::Internal(_) => "Internal",
        }
    }

    pub(crate) fn unauthorized(reason: &str) -> Self {
        Self::Unauthorized(reason.to_string())
    }

    pub(crate) fn access_denied() -> Self {
        Self::AccessDenied(INVALID_ACCESS_RIGHTS.to_string())
    }
}

/// Errors from the owner's off-ledger agent.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("crypto error: {0}")]
    Crypto(#[from] accredit_crypto::CryptoError),

    #[error("core error: {0}")]
    Core(#[from] accredit_core::CoreError),

    #[error("credential {0} is not owned by this agent")]
    NotOwned(CredentialId),
}
