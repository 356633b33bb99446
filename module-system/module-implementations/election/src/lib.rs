#![doc = include_str!("../README.md")]

pub mod call;
pub mod dispatch;
mod error;
pub mod genesis;
pub mod query;
mod tally;
mod types;


use election_state::codec::JsonCodec;
use election_state::{AccessoryStateMap, Prefix, StateMap, StateValue};
pub use error::{ElectionError, ErrorKind};
pub use genesis::ElectionConfig;
pub use tally::Tally;
pub use types::{Candidate, Election, ElectionStatus, Outcome, Vote, CANDIDATES_PER_ELECTION};

/// Namespace of every key written by the module.
pub const MODULE_NAME: &str = "election";

/// Identity of the caller of an operation, authenticated by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext {
    sender: String,
}

impl CallerContext {
    pub fn new(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
        }
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }
}

/// The election ledger.
///
/// Votes are keyed by `(election, voter)`, so every voter writes its own
/// entry and nothing is shared between concurrent voters. Counts are derived
/// by scanning the votes of an election when it is evaluated.
#[derive(Debug, Clone)]
pub struct ElectionModule {
    /// Set once by `init`.
    pub(crate) initialized: StateValue<bool>,

    /// The election name bound by `init`.
    pub(crate) election_name: StateValue<String>,

    pub(crate) elections: StateMap<String, Election, JsonCodec>,

    pub(crate) votes: StateMap<(String, String), Vote, JsonCodec>,

    /// Published outcomes, readable outside of the ledger. The outcome of
    /// election `name` is stored in the accessory state under
    /// `b"election/outcomes/" ++ u32_be(len(name)) ++ name`.
    pub(crate) outcomes: AccessoryStateMap<String, Outcome, JsonCodec>,
}

impl Default for ElectionModule {
    fn default() -> Self {
        Self {
            initialized: StateValue::new(Prefix::for_field(MODULE_NAME, "initialized")),
            election_name: StateValue::new(Prefix::for_field(MODULE_NAME, "election_name")),
            elections: StateMap::with_codec(Prefix::for_field(MODULE_NAME, "elections"), JsonCodec),
            votes: StateMap::with_codec(Prefix::for_field(MODULE_NAME, "votes"), JsonCodec),
            outcomes: AccessoryStateMap::with_codec(
                Prefix::for_field(MODULE_NAME, "outcomes"),
                JsonCodec,
            ),
        }
    }
}
