use std::fmt;

use crate::error::CoreError;

/// Progress of one `(credential, verifier)` access exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum VerificationState {
    /// No request has been seen.
    Idle,
    /// The verifier announced a request; the owner has not answered yet.
    RequestIssued,
    /// The owner granted access against the current root.
    Granted,
    /// The grant was refused (not a member, stale or empty root).
    Denied,
}

impl VerificationState {
    /// Whether the latest request has been answered.
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Granted | Self::Denied)
    }
}

impl fmt::Display for VerificationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::RequestIssued => write!(f, "RequestIssued"),
            Self::Granted => write!(f, "Granted"),
            Self::Denied => write!(f, "Denied"),
        }
    }
}

/// Inputs that move an access exchange forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationEvent {
    /// An `AccessRequested` notification was observed.
    Request,
    /// The ledger accepted the owner's grant.
    Grant,
    /// The ledger (or the owner's local check) refused the grant.
    Deny,
}

/// Transition table for access exchanges.
///
/// Valid transitions:
/// - Idle → RequestIssued (Request)
/// - RequestIssued → RequestIssued (Request)
/// - RequestIssued → Granted (Grant)
/// - RequestIssued → Denied (Deny)
/// - Granted → RequestIssued (Request)
/// - Denied → RequestIssued (Request)
///
/// A resolved exchange is reopened by a fresh request; only the latest
/// request is ever answered.
pub struct VerificationStateMachine;

impl VerificationStateMachine {
    /// Attempt a transition. Returns the new state or an error for invalid moves.
    pub fn transition(
        current: VerificationState,
        event: VerificationEvent,
    ) -> Result<VerificationState, CoreError> {
        let new_state = match (current, event) {
            (_, VerificationEvent::Request) => VerificationState::RequestIssued,
            (VerificationState::RequestIssued, VerificationEvent::Grant) => {
                VerificationState::Granted
            }
            (VerificationState::RequestIssued, VerificationEvent::Deny) => {
                VerificationState::Denied
            }
            (_, VerificationEvent::Grant) => {
                return Err(CoreError::InvalidStateTransition {
                    from: current,
                    to: VerificationState::Granted,
                })
            }
            (_, VerificationEvent::Deny) => {
                return Err(CoreError::InvalidStateTransition {
                    from: current,
                    to: VerificationState::Denied,
                })
            }
        };

        tracing::debug!(
            from = %current,
            to = %new_state,
            event = ?event,
            "verification state transition"
        );

        Ok(new_state)
    }

    /// Check if a transition is valid without performing it.
    pub fn can_transition(current: VerificationState, event: VerificationEvent) -> bool {
        Self::transition(current, event).is_ok()
    }
}
