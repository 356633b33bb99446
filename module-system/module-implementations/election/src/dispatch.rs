//! Named operations, as invoked by the host.
//!
//! Every invocation runs as its own transaction on top of a
//! [`StateCheckpoint`]. Domain failures reply with their code and fatal
//! failures reply with nothing; in both cases the writes of the transaction
//! are discarded.

use election_state::{Event, StateCheckpoint, Storage, WorkingSet};
use tracing::{debug, error};

use crate::call::CallMessage;
use crate::query::{QueryMessage, QueryResponse};
use crate::{CallerContext, ElectionError, ElectionModule};

/// Name of the one-time initializer, the only operation allowed before
/// initialization.
pub const INIT: &str = "init";

/// Reply of every successful operation that returns no record.
pub const OK: &str = "OK";

/// A parsed operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Call(CallMessage),
    Query(QueryMessage),
}

impl Invocation {
    /// Maps an operation name and its positional arguments to an
    /// [`Invocation`]. Extra arguments are ignored.
    pub fn parse(function: &str, params: &[String]) -> Result<Self, ElectionError> {
        let invocation = match function {
            INIT => {
                let [election_name] = args::<1>(INIT, params)?;
                Invocation::Call(CallMessage::Init { election_name })
            }
            "CreateElection" => {
                let [name, one, two, three] = args::<4>("CreateElection", params)?;
                Invocation::Call(CallMessage::CreateElection {
                    name,
                    candidates: vec![one, two, three],
                })
            }
            "SubmitVote" => {
                let [name, voter, choice] = args::<3>("SubmitVote", params)?;
                Invocation::Call(CallMessage::SubmitVote {
                    name,
                    voter,
                    choice,
                })
            }
            "CloseElection" => {
                let [name] = args::<1>("CloseElection", params)?;
                Invocation::Call(CallMessage::CloseElection { name })
            }
            "EvaluateElection" => {
                let [name] = args::<1>("EvaluateElection", params)?;
                Invocation::Call(CallMessage::EvaluateElection { name })
            }
            "QueryElection" => {
                let [name] = args::<1>("QueryElection", params)?;
                Invocation::Query(QueryMessage::QueryElection { name })
            }
            "QueryVote" => {
                let [name, voter] = args::<2>("QueryVote", params)?;
                Invocation::Query(QueryMessage::QueryVote { name, voter })
            }
            "QueryOutcome" => {
                let [name] = args::<1>("QueryOutcome", params)?;
                Invocation::Query(QueryMessage::QueryOutcome { name })
            }
            other => return Err(ElectionError::UnknownOperation(other.to_owned())),
        };
        Ok(invocation)
    }
}

fn args<const N: usize>(
    operation: &'static str,
    params: &[String],
) -> Result<[String; N], ElectionError> {
    if params.len() < N {
        return Err(ElectionError::MissingArguments {
            operation,
            expected: N,
            actual: params.len(),
        });
    }
    Ok(std::array::from_fn(|i| params[i].clone()))
}

/// What happened to the writes of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxEffect {
    /// The writes were kept.
    Successful,
    /// A domain error; its code was sent as the response.
    Rejected(&'static str),
    /// A fatal error; the response is empty.
    Aborted(&'static str),
}

/// Result of [`ElectionModule::apply_transaction`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    /// The bytes written to the response buffer.
    pub payload: Vec<u8>,
    /// Events of the transaction. Empty unless it succeeded.
    pub events: Vec<Event>,
    pub effect: TxEffect,
}

/// Copies `payload` to the start of `buffer` and returns its length.
pub fn write_response(payload: &[u8], buffer: &mut [u8]) -> Result<usize, ElectionError> {
    let needed = payload.len();
    let capacity = buffer.len();
    let target = buffer
        .get_mut(..needed)
        .ok_or(ElectionError::ResponseBufferTooSmall { needed, capacity })?;
    target.copy_from_slice(payload);
    Ok(needed)
}

impl ElectionModule {
    /// Runs the operation `function` as a transaction on top of `checkpoint`
    /// and writes its response to `response`.
    pub fn apply_transaction<S: Storage>(
        &self,
        checkpoint: StateCheckpoint<S>,
        function: &str,
        params: &[String],
        context: &CallerContext,
        response: &mut [u8],
    ) -> (StateCheckpoint<S>, TransactionReceipt) {
        let mut working_set = checkpoint.to_revertable();

        let result = self
            .execute(function, params, context, &mut working_set)
            .and_then(|payload| write_response(&payload, response).map(|_| payload));

        let err = match result {
            Ok(payload) => {
                debug!(function, caller = context.sender(), "Transaction succeeded");
                let events = working_set.take_events();
                let receipt = TransactionReceipt {
                    payload,
                    events,
                    effect: TxEffect::Successful,
                };
                return (working_set.checkpoint(), receipt);
            }
            Err(err) => err,
        };

        let checkpoint = working_set.revert();
        if !err.is_fatal() {
            let payload = err.code().as_bytes().to_vec();
            match write_response(&payload, response) {
                Ok(_) => {
                    debug!(function, code = err.code(), %err, "Transaction rejected");
                    let receipt = TransactionReceipt {
                        payload,
                        events: Vec::new(),
                        effect: TxEffect::Rejected(err.code()),
                    };
                    return (checkpoint, receipt);
                }
                Err(overflow) => return (checkpoint, Self::aborted(function, overflow)),
            }
        }

        (checkpoint, Self::aborted(function, err))
    }

    fn aborted(function: &str, err: ElectionError) -> TransactionReceipt {
        error!(function, code = err.code(), %err, "Transaction aborted");
        TransactionReceipt {
            payload: Vec::new(),
            events: Vec::new(),
            effect: TxEffect::Aborted(err.code()),
        }
    }

    /// Executes an operation and returns its response payload.
    pub fn execute<S: Storage>(
        &self,
        function: &str,
        params: &[String],
        context: &CallerContext,
        working_set: &mut WorkingSet<S>,
    ) -> Result<Vec<u8>, ElectionError> {
        // The binding is loaded once and checked before anything else, so an
        // uninitialized ledger rejects unknown operations the same way.
        let binding = self.binding(working_set)?;
        if binding.is_none() && function != INIT {
            return Err(ElectionError::NotInitialized);
        }

        let invocation = Invocation::parse(function, params)?;
        debug!(
            bound_election = binding.as_ref().map(|b| b.election_name.as_str()),
            function,
            ?params,
            "Executing operation"
        );

        match invocation {
            Invocation::Call(msg) => {
                self.call(msg, context, working_set)?;
                Ok(OK.as_bytes().to_vec())
            }
            Invocation::Query(msg) => match self.query(msg, working_set)? {
                QueryResponse::Election(election) => encode(&election),
                QueryResponse::Vote(vote) => {
                    debug!(voter = %vote.vote_from, choice = %vote.vote_to, "Vote found");
                    Ok(OK.as_bytes().to_vec())
                }
                QueryResponse::Outcome(outcome) => encode(&outcome),
            },
        }
    }
}

fn encode<T: serde::Serialize>(record: &T) -> Result<Vec<u8>, ElectionError> {
    serde_json::to_vec(record).map_err(|e| ElectionError::StateAccess(e.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn parse_operations() {
        assert_eq!(
            Invocation::parse("CreateElection", &params(&["E1", "A", "B", "C"])).unwrap(),
            Invocation::Call(CallMessage::CreateElection {
                name: "E1".to_owned(),
                candidates: params(&["A", "B", "C"]),
            })
        );
        assert_eq!(
            Invocation::parse("QueryVote", &params(&["E1", "alice", "extra"])).unwrap(),
            Invocation::Query(QueryMessage::QueryVote {
                name: "E1".to_owned(),
                voter: "alice".to_owned(),
            })
        );
    }

    #[test]
    fn parse_failures() {
        assert!(matches!(
            Invocation::parse("SubmitVote", &params(&["E1", "alice"])),
            Err(ElectionError::MissingArguments {
                operation: "SubmitVote",
                expected: 3,
                actual: 2,
            })
        ));
        assert!(matches!(
            Invocation::parse("submitvote", &params(&["E1", "alice", "A"])),
            Err(ElectionError::UnknownOperation(_))
        ));
    }

    #[test]
    fn response_must_fit() {
        let mut buffer = [0u8; 4];
        assert_eq!(write_response(b"OK", &mut buffer).unwrap(), 2);
        assert_eq!(&buffer[..2], b"OK");

        let err = write_response(b"NO_VOTES", &mut buffer).unwrap_err();
        assert_eq!(err.code(), "RESPONSE_BUFFER_TOO_SMALL");
        assert!(err.is_fatal());
    }
}
