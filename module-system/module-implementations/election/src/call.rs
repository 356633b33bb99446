use election_state::{Storage, WorkingSet};
use tracing::{debug, info};

use crate::genesis::ElectionConfig;
use crate::tally::Tally;
use crate::types::{Election, ElectionStatus, Outcome, Vote};
use crate::{CallerContext, ElectionError, ElectionModule};

/// Call actions supported by the module.
#[derive(
    borsh::BorshDeserialize,
    borsh::BorshSerialize,
    serde::Serialize,
    serde::Deserialize,
    Debug,
    PartialEq,
    Eq,
    Clone,
)]
pub enum CallMessage {
    Init {
        election_name: String,
    },
    CreateElection {
        name: String,
        candidates: Vec<String>,
    },
    SubmitVote {
        name: String,
        voter: String,
        choice: String,
    },
    CloseElection {
        name: String,
    },
    EvaluateElection {
        name: String,
    },
}

impl ElectionModule {
    /// Executes a call message.
    pub fn call<S: Storage>(
        &self,
        msg: CallMessage,
        context: &CallerContext,
        working_set: &mut WorkingSet<S>,
    ) -> Result<(), ElectionError> {
        match msg {
            CallMessage::Init { election_name } => {
                self.init_module(&ElectionConfig { election_name }, working_set)
            }
            CallMessage::CreateElection { name, candidates } => {
                self.create_election(name, candidates, context, working_set)
            }
            CallMessage::SubmitVote {
                name,
                voter,
                choice,
            } => self.submit_vote(&name, voter, choice, working_set),
            CallMessage::CloseElection { name } => self.close_election(&name, working_set),
            CallMessage::EvaluateElection { name } => {
                self.evaluate_election(&name, working_set).map(|_| ())
            }
        }
    }

    /// Creates an open election organized by the caller.
    pub fn create_election<S: Storage>(
        &self,
        name: String,
        candidates: Vec<String>,
        context: &CallerContext,
        working_set: &mut WorkingSet<S>,
    ) -> Result<(), ElectionError> {
        self.exit_if_election_exists(&name, working_set)?;

        let election = Election::new(name, context.sender().to_owned(), candidates)?;
        self.elections
            .set(&election.name, &election, working_set)?;

        working_set.add_event(
            "Election: create_election",
            &format!("Election created: {}", election.name),
        );
        info!(
            election = %election.name,
            organizer = %election.organizer,
            candidates = ?election.candidates(),
            "Election created"
        );
        Ok(())
    }

    /// Records the vote of `voter`, replacing any earlier vote of theirs.
    pub fn submit_vote<S: Storage>(
        &self,
        name: &str,
        voter: String,
        choice: String,
        working_set: &mut WorkingSet<S>,
    ) -> Result<(), ElectionError> {
        let election = self.existing_election(name, working_set)?;
        Self::exit_if_closed(&election)?;

        if !election.is_candidate(&choice) {
            return Err(ElectionError::InvalidCandidate {
                election: name.to_owned(),
                choice,
            });
        }

        let vote = Vote {
            vote_from: voter,
            vote_to: choice,
        };
        self.votes
            .set(&(name, vote.vote_from.as_str()), &vote, working_set)?;

        working_set.add_event(
            "Election: submit_vote",
            &format!("Vote from: {} accepted", vote.vote_from),
        );
        debug!(election = %name, voter = %vote.vote_from, "Vote accepted");
        Ok(())
    }

    /// Closes an open election. Closing is final.
    pub fn close_election<S: Storage>(
        &self,
        name: &str,
        working_set: &mut WorkingSet<S>,
    ) -> Result<(), ElectionError> {
        let mut election = self.existing_election(name, working_set)?;
        Self::exit_if_closed(&election)?;

        election.status = ElectionStatus::Closed;
        self.elections.set(name, &election, working_set)?;

        working_set.add_event("Election: close_election", &format!("Election closed: {name}"));
        info!(election = %name, "Election closed");
        Ok(())
    }

    /// Tallies the votes of a closed election and publishes the outcome.
    ///
    /// A unique winner is also recorded in the election. Evaluating again
    /// yields the same outcome, since a closed election accepts no votes.
    pub fn evaluate_election<S: Storage>(
        &self,
        name: &str,
        working_set: &mut WorkingSet<S>,
    ) -> Result<Outcome, ElectionError> {
        let mut election = self.existing_election(name, working_set)?;
        if election.is_open() {
            return Err(ElectionError::ElectionStillOpen(name.to_owned()));
        }

        let tally = self.tally(&election, working_set)?;
        let outcome = tally.outcome();

        if let Outcome::Winner(candidate) = &outcome {
            election.winner = candidate.name.clone();
        }
        election.num_votes = tally.counted();
        self.elections.set(name, &election, working_set)?;
        self.outcomes
            .set(name, &outcome, &mut working_set.accessory_state())?;

        working_set.add_event(
            "Election: evaluate_election",
            &format!("Election evaluated: {name}"),
        );
        match &outcome {
            Outcome::Winner(candidate) => info!(
                election = %name,
                winner = %candidate.name,
                votes = candidate.num_votes,
                "Election won"
            ),
            Outcome::Draw => info!(election = %name, counts = ?tally.counts(), "Election is a draw"),
            Outcome::NoVotes => info!(election = %name, "Election has no votes"),
        }
        Ok(outcome)
    }

    /// Counts every vote stored under the election's key prefix.
    pub(crate) fn tally<S: Storage>(
        &self,
        election: &Election,
        working_set: &WorkingSet<S>,
    ) -> Result<Tally, ElectionError> {
        let mut tally = Tally::new(election);
        for entry in self
            .votes
            .scan_prefix(&[election.name.as_str()], working_set)?
        {
            let (_, vote) = entry?;
            tally.record(&vote);
        }
        Ok(tally)
    }

    pub(crate) fn existing_election<S: Storage>(
        &self,
        name: &str,
        working_set: &mut WorkingSet<S>,
    ) -> Result<Election, ElectionError> {
        self.elections
            .get(name, working_set)?
            .ok_or_else(|| ElectionError::ElectionDoesNotExist(name.to_owned()))
    }

    fn exit_if_election_exists<S: Storage>(
        &self,
        name: &str,
        working_set: &mut WorkingSet<S>,
    ) -> Result<(), ElectionError> {
        if self.elections.get(name, working_set)?.is_some() {
            return Err(ElectionError::ElectionAlreadyExists(name.to_owned()));
        }
        Ok(())
    }

    fn exit_if_closed(election: &Election) -> Result<(), ElectionError> {
        if !election.is_open() {
            return Err(ElectionError::ElectionAlreadyClosed(election.name.clone()));
        }
        Ok(())
    }
}
