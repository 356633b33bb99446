use election_state::{Storage, WorkingSet};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{ElectionError, ElectionModule};

/// Genesis configuration of the [`ElectionModule`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionConfig {
    /// Name of the election the ledger is bound to.
    pub election_name: String,
}

/// The one-time binding recorded by `init`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub election_name: String,
}

impl ElectionModule {
    /// Binds the ledger to `config.election_name`. Fails with
    /// [`ElectionError::AlreadyInitialized`] if it is already bound, leaving
    /// the existing binding untouched.
    pub fn genesis<S: Storage>(
        &self,
        config: &ElectionConfig,
        working_set: &mut WorkingSet<S>,
    ) -> Result<(), ElectionError> {
        self.init_module(config, working_set)
    }

    pub(crate) fn init_module<S: Storage>(
        &self,
        config: &ElectionConfig,
        working_set: &mut WorkingSet<S>,
    ) -> Result<(), ElectionError> {
        if let Some(binding) = self.binding(working_set)? {
            return Err(ElectionError::AlreadyInitialized(binding.election_name));
        }

        self.election_name.set(&config.election_name, working_set)?;
        self.initialized.set(&true, working_set)?;

        working_set.add_event(
            "Election: init",
            &format!("Bound to election: {}", config.election_name),
        );
        info!(election_name = %config.election_name, "Election ledger initialized");
        Ok(())
    }

    /// Loads the binding, or `None` if the ledger is not initialized yet.
    pub fn binding<S: Storage>(
        &self,
        working_set: &mut WorkingSet<S>,
    ) -> Result<Option<Binding>, ElectionError> {
        if !self.initialized.get(working_set)?.unwrap_or(false) {
            return Ok(None);
        }

        let election_name = self.election_name.get(working_set)?.unwrap_or_default();
        Ok(Some(Binding { election_name }))
    }
}
