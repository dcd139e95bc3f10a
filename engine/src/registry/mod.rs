//! Widget definition registry
//!
//! Read-mostly union of the compiled-in widget definitions and the ones
//! contributed by installed packages. Lookups are synchronous, non-blocking
//! reads of a cached map: the UI calls [`WidgetRegistry::definition`] and
//! [`WidgetRegistry::all_definitions`] on its paint path.
//!
//! On an id collision an installed definition shadows the built-in one;
//! removing the package reveals the built-in again.

use sdk::types::{Sport, WidgetDefinition};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

pub mod builtin;

/// Cheaply cloneable handle to the shared definition maps
#[derive(Clone)]
pub struct WidgetRegistry {
    inner: Arc<RwLock<RegistryState>>,
}

struct RegistryState {
    builtin: HashMap<String, WidgetDefinition>,
    installed: HashMap<String, WidgetDefinition>,
}

impl WidgetRegistry {
    /// Create a registry seeded with the app's built-in definitions
    pub fn new() -> Self {
        Self::with_builtins(builtin::builtin_definitions())
    }

    /// Create a registry seeded with an explicit built-in set
    pub fn with_builtins(definitions: Vec<WidgetDefinition>) -> Self {
        let builtin = definitions
            .into_iter()
            .map(|definition| (definition.id.clone(), definition))
            .collect();

        Self {
            inner: Arc::new(RwLock::new(RegistryState {
                builtin,
                installed: HashMap::new(),
            })),
        }
    }

    /// Register installed definitions, shadowing built-ins with the same id
    pub fn register(&self, definitions: &[WidgetDefinition]) {
        if definitions.is_empty() {
            return;
        }
        let mut state = self.write_state();
        for definition in definitions {
            debug!("Registering widget definition: {}", definition.id);
            state
                .installed
                .insert(definition.id.clone(), definition.clone());
        }
    }

    /// Unregister installed definitions by id.
    ///
    /// Idempotent: unregistering an absent id is a no-op. Built-ins are
    /// never removed, only un-shadowed.
    pub fn unregister(&self, ids: &[String]) {
        if ids.is_empty() {
            return;
        }
        let mut state = self.write_state();
        for id in ids {
            if state.installed.remove(id).is_some() {
                debug!("Unregistered widget definition: {}", id);
            }
        }
    }

    /// Look up a definition by id; installed shadows built-in
    pub fn definition(&self, id: &str) -> Option<WidgetDefinition> {
        let state = self.read_state();
        state
            .installed
            .get(id)
            .or_else(|| state.builtin.get(id))
            .cloned()
    }

    /// All visible definitions, sorted by display name ascending.
    ///
    /// With a sport given, only definitions whose `supported_sports`
    /// contains it are returned.
    pub fn all_definitions(&self, sport: Option<Sport>) -> Vec<WidgetDefinition> {
        let state = self.read_state();
        let mut merged: HashMap<&String, &WidgetDefinition> = state
            .builtin
            .iter()
            .collect();
        for (id, definition) in &state.installed {
            merged.insert(id, definition);
        }

        let mut definitions: Vec<WidgetDefinition> = merged
            .into_values()
            .filter(|definition| match sport {
                Some(sport) => definition.supported_sports.contains(&sport),
                None => true,
            })
            .cloned()
            .collect();
        definitions.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        definitions
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, RegistryState> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, RegistryState> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for WidgetRegistry {
    fn default() -> Self {
        Self::new()
    }
}
