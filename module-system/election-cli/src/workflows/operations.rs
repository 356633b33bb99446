//! Run ledger operations against local storage.

use election_module::dispatch::{TransactionReceipt, TxEffect, INIT};
use election_module::{CallerContext, ElectionModule};
use election_state::{StateCheckpoint, Storage};
use tracing::info;

/// Capacity of the response buffer handed to the ledger.
pub const RESPONSE_BUFFER_SIZE: usize = 64 * 1024;

/// Invoke one operation of the election ledger
#[derive(clap::Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum OperationWorkflow {
    /// Bind the ledger to an election name. Only allowed once
    Init {
        /// The election this ledger serves
        election_name: String,
    },
    /// Register a new open election with three candidates
    CreateElection {
        /// Name of the election
        name: String,
        candidate_one: String,
        candidate_two: String,
        candidate_three: String,
    },
    /// Record or replace the vote of a voter
    SubmitVote {
        /// Name of the election
        name: String,
        /// Identity of the voter
        voter: String,
        /// Name of the chosen candidate
        choice: String,
    },
    /// Stop accepting votes
    CloseElection {
        /// Name of the election
        name: String,
    },
    /// Count the votes of a closed election and publish the outcome
    EvaluateElection {
        /// Name of the election
        name: String,
    },
    /// Print the stored election record
    QueryElection {
        /// Name of the election
        name: String,
    },
    /// Check that a voter has voted
    QueryVote {
        /// Name of the election
        name: String,
        /// Identity of the voter
        voter: String,
    },
    /// Print the published outcome of an election
    QueryOutcome {
        /// Name of the election
        name: String,
    },
    /// Invoke an operation by name with raw positional arguments
    Invoke {
        /// The operation name, e.g. `SubmitVote`
        function: String,
        /// Positional arguments of the operation
        params: Vec<String>,
    },
}

impl OperationWorkflow {
    /// The operation name and positional arguments handed to the ledger.
    pub fn invocation(&self) -> (&str, Vec<String>) {
        match self {
            OperationWorkflow::Init { election_name } => (INIT, vec![election_name.clone()]),
            OperationWorkflow::CreateElection {
                name,
                candidate_one,
                candidate_two,
                candidate_three,
            } => (
                "CreateElection",
                vec![
                    name.clone(),
                    candidate_one.clone(),
                    candidate_two.clone(),
                    candidate_three.clone(),
                ],
            ),
            OperationWorkflow::SubmitVote {
                name,
                voter,
                choice,
            } => (
                "SubmitVote",
                vec![name.clone(), voter.clone(), choice.clone()],
            ),
            OperationWorkflow::CloseElection { name } => ("CloseElection", vec![name.clone()]),
            OperationWorkflow::EvaluateElection { name } => {
                ("EvaluateElection", vec![name.clone()])
            }
            OperationWorkflow::QueryElection { name } => ("QueryElection", vec![name.clone()]),
            OperationWorkflow::QueryVote { name, voter } => {
                ("QueryVote", vec![name.clone(), voter.clone()])
            }
            OperationWorkflow::QueryOutcome { name } => ("QueryOutcome", vec![name.clone()]),
            OperationWorkflow::Invoke { function, params } => (function.as_str(), params.clone()),
        }
    }

    /// Run the operation as a single transaction and commit its writes.
    pub fn run<S: Storage>(
        &self,
        storage: &S,
        caller: &CallerContext,
    ) -> Result<TransactionReceipt, anyhow::Error> {
        let (function, params) = self.invocation();
        let module = ElectionModule::default();
        let mut response = vec![0u8; RESPONSE_BUFFER_SIZE];

        let checkpoint = StateCheckpoint::new(storage.clone());
        let (mut checkpoint, receipt) =
            module.apply_transaction(checkpoint, function, &params, caller, &mut response);

        if receipt.effect == TxEffect::Successful {
            let state = checkpoint.freeze();
            let accessory = checkpoint.freeze_accessory();
            storage.commit(&state, &accessory)?;
            for event in &receipt.events {
                info!(
                    key = %String::from_utf8_lossy(event.key().inner()),
                    value = %String::from_utf8_lossy(event.value().inner()),
                    "Event"
                );
            }
        }

        Ok(receipt)
    }
}
