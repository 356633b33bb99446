use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ElectionError;

/// Number of candidates of every election.
pub const CANDIDATES_PER_ELECTION: usize = 3;

const DRAW: &str = "DRAW";
const NO_VOTES: &str = "NO_VOTES";

/// Lifecycle of an election. Only `Open` to `Closed` is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElectionStatus {
    Open,
    Closed,
}

/// An election and its registered candidates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ElectionRecord", into = "ElectionRecord")]
pub struct Election {
    pub name: String,
    pub organizer: String,
    candidates: Vec<String>,
    /// Empty until the election is evaluated with a unique winner.
    pub winner: String,
    pub status: ElectionStatus,
    /// Number of votes counted by the last evaluation.
    pub num_votes: u64,
}

impl Election {
    /// Creates an open election. There must be exactly
    /// [`CANDIDATES_PER_ELECTION`] candidates, non-empty and pairwise distinct.
    pub fn new(
        name: String,
        organizer: String,
        candidates: impl Into<Vec<String>>,
    ) -> Result<Self, ElectionError> {
        let candidates = candidates.into();
        validate_candidates(&candidates)?;

        Ok(Self {
            name,
            organizer,
            candidates,
            winner: String::new(),
            status: ElectionStatus::Open,
            num_votes: 0,
        })
    }

    /// The registered candidates, in registration order.
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn is_candidate(&self, choice: &str) -> bool {
        self.candidates.iter().any(|candidate| candidate == choice)
    }

    pub fn is_open(&self) -> bool {
        self.status == ElectionStatus::Open
    }
}

fn validate_candidates(candidates: &[String]) -> Result<(), ElectionError> {
    if candidates.len() != CANDIDATES_PER_ELECTION {
        return Err(ElectionError::InvalidCandidates(
            "an election has exactly three candidates",
        ));
    }
    if candidates.iter().any(|candidate| candidate.is_empty()) {
        return Err(ElectionError::InvalidCandidates(
            "candidate names cannot be empty",
        ));
    }
    for (i, candidate) in candidates.iter().enumerate() {
        if candidates[i + 1..].contains(candidate) {
            return Err(ElectionError::InvalidCandidates(
                "candidate names must be distinct",
            ));
        }
    }
    Ok(())
}

/// Stored form of an [`Election`].
#[derive(Serialize, Deserialize)]
struct ElectionRecord {
    name: String,
    organizer: String,
    candidate_one: String,
    candidate_two: String,
    candidate_three: String,
    winner: String,
    status: ElectionStatus,
    num_votes: u64,
}

impl TryFrom<ElectionRecord> for Election {
    type Error = ElectionError;

    fn try_from(record: ElectionRecord) -> Result<Self, Self::Error> {
        let candidates = vec![
            record.candidate_one,
            record.candidate_two,
            record.candidate_three,
        ];
        validate_candidates(&candidates)?;

        Ok(Self {
            name: record.name,
            organizer: record.organizer,
            candidates,
            winner: record.winner,
            status: record.status,
            num_votes: record.num_votes,
        })
    }
}

impl From<Election> for ElectionRecord {
    fn from(election: Election) -> Self {
        let mut candidates = election.candidates.into_iter();
        let mut next = || candidates.next().unwrap_or_default();

        Self {
            name: election.name,
            organizer: election.organizer,
            candidate_one: next(),
            candidate_two: next(),
            candidate_three: next(),
            winner: election.winner,
            status: election.status,
            num_votes: election.num_votes,
        }
    }
}

/// The vote of a single voter in an election.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub vote_from: String,
    pub vote_to: String,
}

/// A candidate with the number of votes it received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub name: String,
    pub num_votes: u64,
}

/// Result of evaluating a closed election.
///
/// Published as the winning [`Candidate`] document, or as the string
/// `"DRAW"` or `"NO_VOTES"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Winner(Candidate),
    Draw,
    NoVotes,
}

impl Serialize for Outcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Outcome::Winner(candidate) => candidate.serialize(serializer),
            Outcome::Draw => serializer.serialize_str(DRAW),
            Outcome::NoVotes => serializer.serialize_str(NO_VOTES),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OutcomeRecord {
    Sentinel(String),
    Winner(Candidate),
}

impl<'de> Deserialize<'de> for Outcome {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match OutcomeRecord::deserialize(deserializer)? {
            OutcomeRecord::Winner(candidate) => Ok(Outcome::Winner(candidate)),
            OutcomeRecord::Sentinel(sentinel) if sentinel == DRAW => Ok(Outcome::Draw),
            OutcomeRecord::Sentinel(sentinel) if sentinel == NO_VOTES => Ok(Outcome::NoVotes),
            OutcomeRecord::Sentinel(other) => {
                Err(D::Error::custom(format!("unknown outcome {other:?}")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn election() -> Election {
        Election::new(
            "E1".to_owned(),
            "org1".to_owned(),
            ["A".to_owned(), "B".to_owned(), "C".to_owned()],
        )
        .unwrap()
    }

    #[test]
    fn election_is_stored_flat() {
        let value = serde_json::to_value(election()).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "E1",
                "organizer": "org1",
                "candidate_one": "A",
                "candidate_two": "B",
                "candidate_three": "C",
                "winner": "",
                "status": "open",
                "num_votes": 0,
            })
        );

        let decoded: Election = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, election());
        assert_eq!(decoded.candidates(), ["A", "B", "C"]);
    }

    #[test]
    fn duplicate_candidates_are_rejected() {
        let result = Election::new(
            "E1".to_owned(),
            "org1".to_owned(),
            ["A".to_owned(), "B".to_owned(), "A".to_owned()],
        );
        assert!(matches!(result, Err(ElectionError::InvalidCandidates(_))));

        let result = Election::new(
            "E1".to_owned(),
            "org1".to_owned(),
            ["A".to_owned(), String::new(), "C".to_owned()],
        );
        assert!(matches!(result, Err(ElectionError::InvalidCandidates(_))));

        let stored = json!({
            "name": "E1",
            "organizer": "org1",
            "candidate_one": "A",
            "candidate_two": "A",
            "candidate_three": "C",
            "winner": "",
            "status": "closed",
            "num_votes": 0,
        });
        assert!(serde_json::from_value::<Election>(stored).is_err());
    }

    #[test]
    fn outcome_representations() {
        let winner = Outcome::Winner(Candidate {
            name: "A".to_owned(),
            num_votes: 2,
        });
        assert_eq!(
            serde_json::to_string(&winner).unwrap(),
            r#"{"name":"A","num_votes":2}"#
        );
        assert_eq!(serde_json::to_string(&Outcome::Draw).unwrap(), r#""DRAW""#);
        assert_eq!(
            serde_json::to_string(&Outcome::NoVotes).unwrap(),
            r#""NO_VOTES""#
        );

        for outcome in [winner, Outcome::Draw, Outcome::NoVotes] {
            let bytes = serde_json::to_vec(&outcome).unwrap();
            assert_eq!(serde_json::from_slice::<Outcome>(&bytes).unwrap(), outcome);
        }
        assert!(serde_json::from_str::<Outcome>(r#""MAYBE""#).is_err());
    }
}
