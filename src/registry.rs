//! Thread-safe registries mapping session ids to live entities.
//!
//! A registry owns the single readers-writer lock that coordinates
//! cross-entity operations; every entity it hands out sits behind its own
//! mutex, so any one operation on a session is atomic with respect to the
//! others. `last_used` is touched under the entity mutex, never through the
//! registry lock alone.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use crate::catalogue::CustomDeck;
use crate::engine::Game;

const LOG_TARGET: &str = "card_room::registry";

/// Anything a registry can hold: carries a `last_used` stamp for the
/// age-based sweep.
pub trait Entity {
    fn last_used(&self) -> DateTime<Utc>;
    fn touch(&mut self, now: DateTime<Utc>);
}

impl Entity for Game {
    fn last_used(&self) -> DateTime<Utc> {
        self.last_used
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        Game::touch(self, now);
    }
}

impl Entity for CustomDeck {
    fn last_used(&self) -> DateTime<Utc> {
        self.last_used
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        CustomDeck::touch(self, now);
    }
}

pub type Handle<T> = Arc<Mutex<T>>;

pub struct Registry<T> {
    name: &'static str,
    entries: RwLock<HashMap<Uuid, Handle<T>>>,
}

pub type GameRegistry = Registry<Game>;
pub type CustomDeckRegistry = Registry<CustomDeck>;

impl<T: Entity> Registry<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Register an entity under its id and return its handle.
    pub fn insert(&self, id: Uuid, entity: T) -> Handle<T> {
        let handle = Arc::new(Mutex::new(entity));
        let mut entries = self.entries.write();
        entries.insert(id, Arc::clone(&handle));
        debug!(
            target: LOG_TARGET,
            registry = self.name,
            %id,
            total = entries.len(),
            "registered entry"
        );
        handle
    }

    /// Look up an entity and refresh its `last_used` stamp.
    pub fn get(&self, id: &Uuid) -> Option<Handle<T>> {
        let handle = {
            let entries = self.entries.read();
            entries.get(id).cloned()
        };
        if let Some(handle) = &handle {
            handle.lock().touch(Utc::now());
        }
        handle
    }

    pub fn remove(&self, id: &Uuid) -> bool {
        let removed = self.entries.write().remove(id).is_some();
        if removed {
            debug!(target: LOG_TARGET, registry = self.name, %id, "removed entry");
        }
        removed
    }

    /// Snapshot of every entry. Callers lock each handle as they read it.
    pub fn list(&self) -> Vec<(Uuid, Handle<T>)> {
        self.entries
            .read()
            .iter()
            .map(|(id, handle)| (*id, Arc::clone(handle)))
            .collect()
    }

    pub fn count(&self) -> usize {
        self.entries.read().len()
    }

    /// Drop every entry whose `last_used` is older than `now - max_age`.
    /// Returns the number of evicted entries.
    pub fn sweep_older_than(&self, max_age: Duration, now: DateTime<Utc>) -> usize {
        let cutoff = now - max_age;
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|id, handle| {
            let stale = handle.lock().last_used() < cutoff;
            if stale {
                debug!(
                    target: LOG_TARGET,
                    registry = self.name,
                    %id,
                    "evicting stale entry"
                );
            }
            !stale
        });
        let evicted = before - entries.len();
        if evicted > 0 {
            info!(
                target: LOG_TARGET,
                registry = self.name,
                evicted,
                remaining = entries.len(),
                "swept stale entries"
            );
        }
        evicted
    }
}
