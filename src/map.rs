use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

use itertools::Itertools;
use serde_json::Value;

use crate::cell::{Cell, Subscription};

/// Entries of one shared map.
pub type MapEntries = BTreeMap<String, Value>;

/// Registry of named shared maps.
///
/// `get_map` hands out handles; handles for the same name share state,
/// so a write through any of them is observed through all of them.
/// Durability and peer synchronization are the concern of whatever owns
/// the registry, not of the maps themselves.
pub struct MapStore {
    maps: RefCell<HashMap<String, SharedMap>>,
}

impl MapStore {
    pub fn new() -> Self {
        Self {
            maps: RefCell::new(HashMap::new()),
        }
    }

    /// Returns the map registered under `name`, creating an empty one
    /// on first request.
    pub fn get_map(&self, name: &str) -> SharedMap {
        self.maps
            .borrow_mut()
            .entry(name.to_string())
            .or_insert_with(SharedMap::new)
            .clone()
    }

    /// Names that currently have a map, sorted.
    pub fn names(&self) -> Vec<String> {
        self.maps.borrow().keys().cloned().sorted().collect()
    }
}

impl Default for MapStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Observable map of JSON entries, with the same subscribe contract as
/// a [`Cell`]. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct SharedMap {
    entries: Cell<MapEntries>,
}

impl SharedMap {
    fn new() -> Self {
        Self {
            entries: Cell::new(MapEntries::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries.get().get(key).cloned()
    }

    /// Inserts an entry; subscribers are notified once per insert.
    pub fn insert(&self, key: impl Into<String>, value: Value) {
        let key = key.into();
        self.entries.update(move |entries| {
            let mut next = entries.clone();
            next.insert(key, value);
            next
        });
    }

    /// Removes an entry and returns its value. Removing an absent key
    /// is a read-only no-op and does not notify.
    pub fn remove(&self, key: &str) -> Option<Value> {
        let mut next = self.entries.get();
        let removed = next.remove(key);
        if removed.is_some() {
            self.entries.set(next);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.get().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.get().is_empty()
    }

    /// Same contract as [`Cell::subscribe`]: the callback runs once with
    /// the current entries, then on every change.
    pub fn subscribe(
        &self,
        callback: impl Fn(&MapEntries) + 'static,
    ) -> Subscription<MapEntries> {
        self.entries.subscribe(callback)
    }

    /// The underlying cell, for derived views over the whole map.
    pub fn cell(&self) -> &Cell<MapEntries> {
        &self.entries
    }
}
