use crate::framework::RoutingSystem;
use crate::util::is_inf;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::time::Duration;
use educe::Educe;

/// When a table entry stops being trusted. Time is measured from an arbitrary epoch chosen by
/// the embedder, the router only ever compares it against the `now` it is handed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Expiry {
    /// never times out, used for directly attached hosts
    Forever,
    At(Duration),
}

impl Expiry {
    /// An entry expires exactly when `now >= t`, never before
    pub fn is_expired(&self, now: Duration) -> bool {
        match self {
            Expiry::Forever => false,
            Expiry::At(t) => now >= *t,
        }
    }
}

#[derive(Educe)]
#[educe(Clone(bound()), Debug(bound()), PartialEq(bound()))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(bound = ""))]
pub struct TableEntry<T: RoutingSystem + ?Sized> {
    /// the destination this route leads to
    pub dest: T::NodeAddress,
    /// the local port that leads to the next hop
    pub link: T::Link,
    /// total latency to the destination, INF for a withdrawn route
    pub latency: u16,
    pub expiry: Expiry,
}

impl<T: RoutingSystem + ?Sized> TableEntry<T> {
    pub fn is_reachable(&self) -> bool {
        !is_inf(self.latency)
    }
}
