//! Process-wide research run identifier.
//!
//! The legacy single-run model keeps one active run id per process: every
//! concurrent step execution namespaces its artifacts under it. Mutation is
//! serialized behind a lock; the id is nevertheless threaded explicitly
//! through the coordinator and executor so no component reads ambient state
//! mid-run.

use parking_lot::RwLock;
use rand::Rng;

/// Issues and holds the identifier that scopes all artifacts of one run.
pub struct RunRegistry {
    active: RwLock<Option<String>>,
}

impl RunRegistry {
    /// Creates an empty registry; the first [`RunRegistry::current`] call
    /// generates an id.
    pub fn new() -> Self {
        Self {
            active: RwLock::new(None),
        }
    }

    /// Returns the active run id, generating one if none is set.
    pub fn current(&self) -> String {
        let mut guard = self.active.write();
        match guard.as_ref() {
            Some(id) => id.clone(),
            None => {
                let id = Self::generate();
                tracing::info!(run_id = %id, "generated research run id");
                *guard = Some(id.clone());
                id
            }
        }
    }

    /// Replaces the active run id.
    pub fn set(&self, id: impl Into<String>) {
        *self.active.write() = Some(id.into());
    }

    /// Generates and installs a fresh run id; called when a new plan is
    /// built.
    pub fn regenerate(&self) -> String {
        let id = Self::generate();
        tracing::info!(run_id = %id, "generated research run id");
        *self.active.write() = Some(id.clone());
        id
    }

    // Short, human-typeable, unique enough within one process lifetime.
    fn generate() -> String {
        rand::rng().random_range(1000..=9999).to_string()
    }
}

impl Default for RunRegistry {
    fn default() -> Self {
        Self::new()
    }
}
