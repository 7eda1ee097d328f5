use crate::framework::RoutingSystem;
use std::collections::HashMap;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "serde")]
use serde_with::serde_as;
use educe::Educe;

/// The set of local links that are currently up, with their latencies
#[cfg_attr(feature = "serde", serde_as)]
#[derive(Educe)]
#[educe(Default(bound()), Debug(bound()))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(bound = ""))]
pub struct Ports<T: RoutingSystem + ?Sized> {
    #[serde_as(as = "Vec<(_, _)>")]
    latencies: HashMap<T::Link, u16>,
}

impl<T: RoutingSystem + ?Sized> Ports<T> {
    pub fn new() -> Self {
        Self {
            latencies: HashMap::new(),
        }
    }
    /// registers a link as up, calling this again for a link that is already up updates its latency
    pub fn add_port(&mut self, link: T::Link, latency: u16) {
        self.latencies.insert(link, latency);
    }
    /// returns whether the link was up
    pub fn remove_port(&mut self, link: &T::Link) -> bool {
        self.latencies.remove(link).is_some()
    }
    pub fn get_all_ports(&self) -> Vec<T::Link> {
        self.latencies.keys().cloned().collect()
    }
    /// None if the link is not up
    pub fn latency_of(&self, link: &T::Link) -> Option<u16> {
        self.latencies.get(link).copied()
    }
    pub fn contains(&self, link: &T::Link) -> bool {
        self.latencies.contains_key(link)
    }
    pub fn len(&self) -> usize {
        self.latencies.len()
    }
    pub fn is_empty(&self) -> bool {
        self.latencies.is_empty()
    }
}
