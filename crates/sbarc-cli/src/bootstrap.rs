//! CLI bootstrap, the composition root.
//!
//! The only place where the resolver, the process runner and the console
//! sink are wired into a supervisor.

use std::sync::Arc;

use sbarc_core::{Settings, SettingsStore};
use sbarc_runtime::{SessionSupervisor, SystemResolver, TokioProcessRunner};
use tracing::debug;

use crate::error::CliError;
use crate::presentation::ConsoleSink;

/// Everything a command handler needs.
pub struct CliContext {
    pub supervisor: SessionSupervisor,
    pub store: SettingsStore,
    pub resolver: Arc<SystemResolver>,
}

impl CliContext {
    /// Build a context around an already opened settings store.
    pub fn with_store(store: SettingsStore) -> Self {
        let settings = store.load();
        let resolver = Arc::new(SystemResolver::new());
        let supervisor = SessionSupervisor::new(
            resolver.clone(),
            Arc::new(TokioProcessRunner::new()),
            Arc::new(ConsoleSink),
        )
        .with_settings(settings);
        Self {
            supervisor,
            store,
            resolver,
        }
    }

    pub fn settings(&self) -> Settings {
        self.supervisor.settings()
    }

    /// Persist `settings` and apply them to future launches.
    pub fn update_settings(&self, settings: Settings) -> Result<(), CliError> {
        self.store.save(&settings)?;
        self.supervisor.set_settings(settings);
        Ok(())
    }
}

/// Open the settings file in the platform config directory and compose
/// the runtime.
pub fn bootstrap() -> Result<CliContext, CliError> {
    let store = SettingsStore::open_default()?;
    debug!(path = %store.path().display(), "Using settings file");
    Ok(CliContext::with_store(store))
}
