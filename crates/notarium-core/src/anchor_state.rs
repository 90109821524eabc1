use std::fmt;

use crate::error::CoreError;

/// The states a credential passes through while it is being anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum AnchorState {
    /// Credential data is being assembled from the subject.
    Built,
    /// Canonical bytes and digest have been computed.
    Digested,
    /// The anchoring transaction was accepted by the ledger.
    Submitted,
    /// A receipt with a block number was observed.
    Confirmed,
    /// Ledger metadata is attached. Final, successful.
    MetadataAttached,
    /// The subject failed ingress validation. Final.
    Rejected,
    /// The credential could not be canonicalized. Final.
    EncodingFailed,
    /// The ledger rejected the transaction. Final.
    SubmissionFailed,
    /// No receipt within the polling bound, or the item was cancelled. Final.
    ConfirmationTimedOut,
}

impl AnchorState {
    /// Whether this is a final (terminal) state.
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            Self::MetadataAttached
                | Self::Rejected
                | Self::EncodingFailed
                | Self::SubmissionFailed
                | Self::ConfirmationTimedOut
        )
    }

    /// Whether this is the successful terminal state.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::MetadataAttached)
    }
}

impl fmt::Display for AnchorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Built => write!(f, "Built"),
            Self::Digested => write!(f, "Digested"),
            Self::Submitted => write!(f, "Submitted"),
            Self::Confirmed => write!(f, "Confirmed"),
            Self::MetadataAttached => write!(f, "MetadataAttached"),
            Self::Rejected => write!(f, "Rejected"),
            Self::EncodingFailed => write!(f, "EncodingFailed"),
            Self::SubmissionFailed => write!(f, "SubmissionFailed"),
            Self::ConfirmationTimedOut => write!(f, "ConfirmationTimedOut"),
        }
    }
}

/// Events that drive anchoring state transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorEvent {
    /// Subject validation failed.
    Reject,
    /// Digest computed.
    Digest,
    /// Canonicalization failed.
    EncodingFail,
    /// Ledger accepted the transaction.
    Submit,
    /// Ledger rejected the transaction.
    SubmissionFail,
    /// Receipt observed.
    Confirm,
    /// Polling deadline passed.
    TimeOut,
    /// Cancellation observed before or during confirmation.
    Cancel,
    /// Metadata recorded.
    AttachMetadata,
}

impl fmt::Display for AnchorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Anchoring lifecycle transitions.
///
/// Valid transitions:
/// - Built → Rejected (Reject)
/// - Built → Digested (Digest)
/// - Built → EncodingFailed (EncodingFail)
/// - Digested → Submitted (Submit)
/// - Digested → SubmissionFailed (SubmissionFail)
/// - Submitted → Confirmed (Confirm)
/// - Digested → ConfirmationTimedOut (Cancel)
/// - Submitted → ConfirmationTimedOut (TimeOut)
/// - Submitted → ConfirmationTimedOut (Cancel)
/// - Confirmed → MetadataAttached (AttachMetadata)
pub struct AnchorStateMachine;

impl AnchorStateMachine {
    /// Apply an event, returning the next state or an error for an
    /// invalid transition.
    pub fn transition(current: AnchorState, event: AnchorEvent) -> Result<AnchorState, CoreError> {
        let next = match (current, event) {
            (AnchorState::Built, AnchorEvent::Reject) => AnchorState::Rejected,
            (AnchorState::Built, AnchorEvent::Digest) => AnchorState::Digested,
            (AnchorState::Built, AnchorEvent::EncodingFail) => AnchorState::EncodingFailed,

            (AnchorState::Digested, AnchorEvent::Submit) => AnchorState::Submitted,
            (AnchorState::Digested, AnchorEvent::SubmissionFail) => AnchorState::SubmissionFailed,
            (AnchorState::Digested, AnchorEvent::Cancel) => AnchorState::ConfirmationTimedOut,

            (AnchorState::Submitted, AnchorEvent::Confirm) => AnchorState::Confirmed,
            (AnchorState::Submitted, AnchorEvent::TimeOut) => AnchorState::ConfirmationTimedOut,
            (AnchorState::Submitted, AnchorEvent::Cancel) => AnchorState::ConfirmationTimedOut,

            (AnchorState::Confirmed, AnchorEvent::AttachMetadata) => AnchorState::MetadataAttached,

            _ => {
                return Err(CoreError::InvalidStateTransition {
                    from: current,
                    event,
                })
            }
        };

        tracing::debug!(
            from = %current,
            to = %next,
            event = ?event,
            "anchoring state transition"
        );

        Ok(next)
    }

    /// Check if a transition is valid without performing it.
    pub fn can_transition(current: AnchorState, event: AnchorEvent) -> bool {
        Self::transition(current, event).is_ok()
    }
}
