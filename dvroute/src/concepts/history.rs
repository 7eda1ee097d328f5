use crate::framework::RoutingSystem;
use std::collections::HashMap;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "serde")]
use serde_with::serde_as;
use educe::Educe;

/// The latency last advertised for each (destination, link) pair.
/// Entries are overwritten on every send and never removed; the periodic forced broadcast
/// resynchronizes any that went stale.
#[cfg_attr(feature = "serde", serde_as)]
#[derive(Educe)]
#[educe(Default(bound()), Debug(bound()))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(bound = ""))]
pub struct AdvertisementHistory<T: RoutingSystem + ?Sized> {
    #[serde_as(as = "Vec<(_, _)>")]
    sent: HashMap<(T::NodeAddress, T::Link), u16>,
}

impl<T: RoutingSystem + ?Sized> AdvertisementHistory<T> {
    pub fn new() -> Self {
        Self {
            sent: HashMap::new(),
        }
    }
    pub fn last_sent(&self, dest: &T::NodeAddress, link: &T::Link) -> Option<u16> {
        self.sent.get(&(dest.clone(), link.clone())).copied()
    }
    /// whether `latency` differs from what was last sent, or nothing was sent yet
    pub fn is_stale(&self, dest: &T::NodeAddress, link: &T::Link, latency: u16) -> bool {
        self.last_sent(dest, link) != Some(latency)
    }
    pub fn record(&mut self, dest: T::NodeAddress, link: T::Link, latency: u16) {
        self.sent.insert((dest, link), latency);
    }
}
