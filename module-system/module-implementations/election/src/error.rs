use election_state::key::KeyError;
use thiserror::Error;

/// How an [`ElectionError`] is handled by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An election, vote or outcome is absent.
    NotFound,
    /// The operation does not apply to the current state.
    StateConflict,
    /// The arguments are not acceptable.
    MalformedInput,
    /// The ledger has not been initialized.
    Uninitialized,
    /// The storage or the response channel failed.
    Fault,
}

/// Errors of the election module.
///
/// Every variant maps to a stable code returned by [`ElectionError::code`].
#[derive(Debug, Error)]
pub enum ElectionError {
    #[error("the election ledger is not initialized")]
    NotInitialized,

    #[error("the election ledger is already bound to {0:?}")]
    AlreadyInitialized(String),

    #[error("election {0:?} already exists")]
    ElectionAlreadyExists(String),

    #[error("election {0:?} does not exist")]
    ElectionDoesNotExist(String),

    #[error("election {0:?} is already closed")]
    ElectionAlreadyClosed(String),

    #[error("election {0:?} is still open")]
    ElectionStillOpen(String),

    #[error("election {0:?} has no votes")]
    NoVotes(String),

    #[error("no vote from {voter:?} in election {election:?}")]
    VoteNotFound { election: String, voter: String },

    #[error("{choice:?} is not a candidate of election {election:?}")]
    InvalidCandidate { election: String, choice: String },

    #[error("invalid candidate list: {0}")]
    InvalidCandidates(&'static str),

    #[error("no outcome has been published for election {0:?}")]
    OutcomeNotPublished(String),

    #[error(transparent)]
    InvalidKeyPart(#[from] KeyError),

    #[error("unknown operation {0:?}")]
    UnknownOperation(String),

    #[error("{operation} expects {expected} arguments, got {actual}")]
    MissingArguments {
        operation: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("response of {needed} bytes does not fit a buffer of {capacity} bytes")]
    ResponseBufferTooSmall { needed: usize, capacity: usize },

    #[error("state access failed: {0:#}")]
    StateAccess(anyhow::Error),
}

impl ElectionError {
    /// The stable, machine-checkable code of the error.
    pub fn code(&self) -> &'static str {
        match self {
            ElectionError::NotInitialized => "NOT_INITIALIZED",
            ElectionError::AlreadyInitialized(_) => "ALREADY_INITIALIZED",
            ElectionError::ElectionAlreadyExists(_) => "ELECTION_ALREADY_EXISTS",
            ElectionError::ElectionDoesNotExist(_) => "ELECTION_DOES_NOT_EXIST",
            ElectionError::ElectionAlreadyClosed(_) => "ELECTION_ALREADY_CLOSED",
            ElectionError::ElectionStillOpen(_) => "ELECTION_STILL_OPEN",
            ElectionError::NoVotes(_) => "NO_VOTES",
            ElectionError::VoteNotFound { .. } => "VOTE_NOT_FOUND",
            ElectionError::InvalidCandidate { .. } => "INVALID_CANDIDATE",
            ElectionError::InvalidCandidates(_) => "INVALID_CANDIDATES",
            ElectionError::OutcomeNotPublished(_) => "OUTCOME_NOT_PUBLISHED",
            ElectionError::InvalidKeyPart(_) => "INVALID_KEY_PART",
            ElectionError::UnknownOperation(_) => "UNKNOWN_OPERATION",
            ElectionError::MissingArguments { .. } => "MISSING_ARGUMENTS",
            ElectionError::ResponseBufferTooSmall { .. } => "RESPONSE_BUFFER_TOO_SMALL",
            ElectionError::StateAccess(_) => "STATE_ACCESS_FAILED",
        }
    }

    /// The class of the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ElectionError::ElectionDoesNotExist(_)
            | ElectionError::NoVotes(_)
            | ElectionError::VoteNotFound { .. }
            | ElectionError::OutcomeNotPublished(_) => ErrorKind::NotFound,
            ElectionError::AlreadyInitialized(_)
            | ElectionError::ElectionAlreadyExists(_)
            | ElectionError::ElectionAlreadyClosed(_)
            | ElectionError::ElectionStillOpen(_) => ErrorKind::StateConflict,
            ElectionError::InvalidCandidate { .. }
            | ElectionError::InvalidCandidates(_)
            | ElectionError::InvalidKeyPart(_)
            | ElectionError::UnknownOperation(_)
            | ElectionError::MissingArguments { .. } => ErrorKind::MalformedInput,
            ElectionError::NotInitialized => ErrorKind::Uninitialized,
            ElectionError::ResponseBufferTooSmall { .. } | ElectionError::StateAccess(_) => {
                ErrorKind::Fault
            }
        }
    }

    /// Fatal errors abort the transaction with an empty response instead of
    /// replying with their code.
    pub fn is_fatal(&self) -> bool {
        match self.kind() {
            ErrorKind::NotFound | ErrorKind::StateConflict => false,
            ErrorKind::MalformedInput => !matches!(
                self,
                ElectionError::InvalidCandidate { .. } | ElectionError::InvalidCandidates(_)
            ),
            ErrorKind::Uninitialized | ErrorKind::Fault => true,
        }
    }
}

impl From<anyhow::Error> for ElectionError {
    fn from(err: anyhow::Error) -> Self {
        // Containers surface key framing errors through `anyhow`.
        match err.downcast_ref::<KeyError>() {
            Some(key_error) => ElectionError::InvalidKeyPart(key_error.clone()),
            None => ElectionError::StateAccess(err),
        }
    }
}
