use crate::framework::RoutingSystem;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use educe::Educe;

#[derive(Educe)]
#[educe(Clone(bound()), Debug(bound()), PartialEq(bound()))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(bound = ""))]
pub enum Packet<T: RoutingSystem + ?Sized> {
    /// the sender can reach `destination` with `latency`, INF for a withdrawal
    RouteAdvertisement {
        destination: T::NodeAddress,
        latency: u16,
    },
    /// user traffic, forwarded hop by hop using the routing table
    Data {
        destination: T::NodeAddress,
        payload: Vec<u8>,
    },
}

#[derive(Educe)]
#[educe(Clone(bound()), Debug(bound()), PartialEq(bound()))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(bound = ""))]
pub struct OutboundPacket<T: RoutingSystem + ?Sized> {
    /// send out of this local port
    pub link: T::Link,
    pub packet: Packet<T>,
}
