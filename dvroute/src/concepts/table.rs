use crate::concepts::route::TableEntry;
use crate::framework::RoutingSystem;
use std::collections::hash_map::Values;
use std::collections::HashMap;
use std::time::Duration;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use educe::Educe;

/// The current best route to each destination, at most one entry per destination
#[derive(Educe)]
#[educe(Default(bound()), Debug(bound()))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(bound = ""))]
pub struct Table<T: RoutingSystem + ?Sized> {
    entries: HashMap<T::NodeAddress, TableEntry<T>>,
}

impl<T: RoutingSystem + ?Sized> Table<T> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
    pub fn get(&self, dest: &T::NodeAddress) -> Option<&TableEntry<T>> {
        self.entries.get(dest)
    }
    pub fn get_mut(&mut self, dest: &T::NodeAddress) -> Option<&mut TableEntry<T>> {
        self.entries.get_mut(dest)
    }
    /// inserts or replaces the entry for `entry.dest`, returning the previous entry
    pub fn insert(&mut self, entry: TableEntry<T>) -> Option<TableEntry<T>> {
        self.entries.insert(entry.dest.clone(), entry)
    }
    pub fn remove(&mut self, dest: &T::NodeAddress) -> Option<TableEntry<T>> {
        self.entries.remove(dest)
    }
    pub fn entries(&self) -> Values<'_, T::NodeAddress, TableEntry<T>> {
        self.entries.values()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Destinations whose entries have expired at `now`. Collected up front so the caller can
    /// mutate the table while walking the result.
    pub fn expired(&self, now: Duration) -> Vec<T::NodeAddress> {
        self.entries
            .values()
            .filter(|entry| entry.expiry.is_expired(now))
            .map(|entry| entry.dest.clone())
            .collect()
    }

    /// Destinations currently routed through `link`
    pub fn routed_via(&self, link: &T::Link) -> Vec<T::NodeAddress> {
        self.entries
            .values()
            .filter(|entry| entry.link == *link)
            .map(|entry| entry.dest.clone())
            .collect()
    }
}
