use tracing::warn;

use crate::types::{Candidate, Election, Outcome, Vote};

/// Per-candidate vote counts of a single election.
///
/// Only the registered candidates are counted. The verdict depends on the
/// counts alone, never on the order the votes were recorded in.
#[derive(Debug, Clone)]
pub struct Tally {
    election: String,
    counts: Vec<Candidate>,
    rejected: u64,
}

impl Tally {
    pub fn new(election: &Election) -> Self {
        Self {
            election: election.name.clone(),
            counts: election
                .candidates()
                .iter()
                .map(|name| Candidate {
                    name: name.clone(),
                    num_votes: 0,
                })
                .collect(),
            rejected: 0,
        }
    }

    /// Counts `vote`. Returns `false` if its choice is not a candidate, in
    /// which case the vote is skipped.
    pub fn record(&mut self, vote: &Vote) -> bool {
        match self
            .counts
            .iter_mut()
            .find(|candidate| candidate.name == vote.vote_to)
        {
            Some(candidate) => {
                candidate.num_votes = candidate.num_votes.saturating_add(1);
                true
            }
            None => {
                warn!(
                    election = %self.election,
                    voter = %vote.vote_from,
                    choice = %vote.vote_to,
                    "Skipping vote for an unregistered candidate"
                );
                self.rejected += 1;
                false
            }
        }
    }

    /// Number of votes counted for a registered candidate.
    pub fn counted(&self) -> u64 {
        self.counts.iter().map(|candidate| candidate.num_votes).sum()
    }

    /// Number of skipped votes.
    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    pub fn counts(&self) -> &[Candidate] {
        &self.counts
    }

    /// Resolves the winner, a draw, or the absence of votes.
    pub fn outcome(&self) -> Outcome {
        if self.counted() == 0 {
            return Outcome::NoVotes;
        }

        let mut best: Option<&Candidate> = None;
        let mut best_count = 0;
        let mut tie_count = 0u32;

        for candidate in &self.counts {
            if candidate.num_votes > best_count {
                best = Some(candidate);
                best_count = candidate.num_votes;
                tie_count = 0;
            } else if best.is_some() && candidate.num_votes == best_count {
                tie_count += 1;
            }
        }

        match best {
            Some(candidate) if tie_count == 0 => Outcome::Winner(candidate.clone()),
            _ => Outcome::Draw,
        }
    }
}
