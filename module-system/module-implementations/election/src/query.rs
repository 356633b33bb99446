use election_state::{Storage, WorkingSet};
use tracing::debug;

use crate::types::{Election, Outcome, Vote};
use crate::{ElectionError, ElectionModule};

/// Read-only requests supported by the module.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum QueryMessage {
    QueryElection { name: String },
    QueryVote { name: String, voter: String },
    QueryOutcome { name: String },
}

/// Answer to a [`QueryMessage`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum QueryResponse {
    Election(Election),
    Vote(Vote),
    Outcome(Outcome),
}

impl ElectionModule {
    /// Executes a query.
    pub fn query<S: Storage>(
        &self,
        msg: QueryMessage,
        working_set: &mut WorkingSet<S>,
    ) -> Result<QueryResponse, ElectionError> {
        match msg {
            QueryMessage::QueryElection { name } => self
                .query_election(&name, working_set)
                .map(QueryResponse::Election),
            QueryMessage::QueryVote { name, voter } => self
                .query_vote(&name, &voter, working_set)
                .map(QueryResponse::Vote),
            QueryMessage::QueryOutcome { name } => self
                .query_outcome(&name, working_set)
                .map(QueryResponse::Outcome),
        }
    }

    /// Returns the election named `name`.
    pub fn query_election<S: Storage>(
        &self,
        name: &str,
        working_set: &mut WorkingSet<S>,
    ) -> Result<Election, ElectionError> {
        self.existing_election(name, working_set)
    }

    /// Returns the vote of `voter`.
    ///
    /// Fails with [`ElectionError::ElectionDoesNotExist`], then
    /// [`ElectionError::NoVotes`] if nobody voted, then
    /// [`ElectionError::VoteNotFound`].
    pub fn query_vote<S: Storage>(
        &self,
        name: &str,
        voter: &str,
        working_set: &mut WorkingSet<S>,
    ) -> Result<Vote, ElectionError> {
        self.existing_election(name, working_set)?;

        let has_votes = self
            .votes
            .scan_prefix(&[name], working_set)?
            .next()
            .transpose()?
            .is_some();
        if !has_votes {
            debug!(election = %name, "There are no votes");
            return Err(ElectionError::NoVotes(name.to_owned()));
        }

        self.votes
            .get(&(name, voter), working_set)?
            .ok_or_else(|| ElectionError::VoteNotFound {
                election: name.to_owned(),
                voter: voter.to_owned(),
            })
    }

    /// Returns the outcome published by the last evaluation of the election.
    pub fn query_outcome<S: Storage>(
        &self,
        name: &str,
        working_set: &mut WorkingSet<S>,
    ) -> Result<Outcome, ElectionError> {
        self.existing_election(name, working_set)?;

        self.outcomes
            .get(name, &mut working_set.accessory_state())?
            .ok_or_else(|| ElectionError::OutcomeNotPublished(name.to_owned()))
    }
}
