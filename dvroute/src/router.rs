use crate::concepts::history::AdvertisementHistory;
use crate::concepts::packet::{OutboundPacket, Packet};
use crate::concepts::port::Ports;
use crate::concepts::route::{Expiry, TableEntry};
use crate::concepts::table::Table;
use crate::feedback::{ConfigError, RoutingError};
use crate::framework::{LoopAvoidance, ProtocolParams, RoutingSystem};
use crate::util::{is_inf, sum_inf};
use log::{debug, info, warn};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Latencies at or above this are unreachable. Kept small so that count-to-infinity terminates.
pub const INF: u16 = 16;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(bound = ""))]
pub struct Router<T: RoutingSystem + ?Sized> {
    /// name of this router, only used for diagnostics
    pub address: T::NodeAddress,
    pub ports: Ports<T>,
    pub table: Table<T>,
    pub history: AdvertisementHistory<T>,
    pub outbound_packets: Vec<OutboundPacket<T>>,
    pub params: ProtocolParams,
}

impl<T: RoutingSystem> Router<T> {
    /// creates a router using `T::config()`
    pub fn new(address: T::NodeAddress) -> Result<Self, ConfigError> {
        Self::with_params(address, T::config())
    }

    pub fn with_params(address: T::NodeAddress, params: ProtocolParams) -> Result<Self, ConfigError> {
        params.validate()?;
        Ok(Self {
            address,
            ports: Ports::new(),
            table: Table::new(),
            history: AdvertisementHistory::new(),
            outbound_packets: Vec::new(),
            params,
        })
    }

    // region Interface
    fn write_packet(&mut self, link: T::Link, packet: Packet<T>) {
        self.outbound_packets.push(OutboundPacket { link, packet });
    }

    pub fn get_route(&self, dest: &T::NodeAddress) -> Option<&TableEntry<T>> {
        self.table.get(dest)
    }

    /// handle a single packet received on `link`
    pub fn handle_packet(
        &mut self,
        packet: &Packet<T>,
        link: &T::Link,
        now: Duration,
    ) -> Result<(), RoutingError<T>> {
        match packet {
            Packet::RouteAdvertisement { destination, latency } => {
                self.handle_advertisement(destination.clone(), *latency, link, now)
            }
            Packet::Data { destination, payload } => {
                self.forward(destination.clone(), payload.clone());
                Ok(())
            }
        }
    }

    /// Periodic timer, drops or poisons expired routes then re-sends the whole table
    pub fn handle_timer(&mut self, now: Duration) {
        self.expire_routes(now);
        self.send_routes(true, None);
    }
    // endregion

    // region Advertisement

    /// The latency to advertise for `entry` out of `link`, None if it should not be advertised
    fn advertised_latency(mode: LoopAvoidance, entry: &TableEntry<T>, link: &T::Link) -> Option<u16> {
        if entry.link != *link {
            return Some(entry.latency);
        }
        match mode {
            LoopAvoidance::None => Some(entry.latency),
            LoopAvoidance::SplitHorizon => None,
            LoopAvoidance::PoisonReverse => Some(INF),
        }
    }

    /// Advertises routes to neighbours, returns how many advertisements were written.
    ///
    /// # Arguments
    ///
    /// * `force`: send every route, otherwise only those whose advertised latency changed since
    ///   they were last sent on that link
    /// * `single_link`: send the whole table to this link only, regardless of history and
    ///   without loop avoidance
    pub fn send_routes(&mut self, force: bool, single_link: Option<&T::Link>) -> usize {
        let links = match single_link {
            Some(link) => {
                if !self.ports.contains(link) {
                    warn!("{:?} refusing to advertise over {:?}, the link is not up", self.address, link);
                    return 0;
                }
                vec![link.clone()]
            }
            None => self.ports.get_all_ports(),
        };
        let force = force || single_link.is_some();

        let mut adverts = Vec::new();
        for entry in self.table.entries() {
            for link in &links {
                // a freshly connected neighbour gets the table as is
                let latency = if single_link.is_some() {
                    entry.latency
                } else {
                    match Self::advertised_latency(self.params.loop_avoidance, entry, link) {
                        Some(latency) => latency,
                        None => continue, // split horizon
                    }
                };
                if force || self.history.is_stale(&entry.dest, link, latency) {
                    adverts.push((entry.dest.clone(), link.clone(), latency));
                }
            }
        }

        let sent = adverts.len();
        for (dest, link, latency) in adverts {
            self.history.record(dest.clone(), link.clone(), latency);
            self.write_packet(link, Packet::RouteAdvertisement {
                destination: dest,
                latency,
            });
        }
        if sent > 0 {
            debug!("{:?} sent {sent} route advertisements (force={force})", self.address);
        }
        sent
    }
    // endregion

    // region Route Updates

    /// Applies a neighbour's advertisement for `dest` received on `link`
    pub fn handle_advertisement(
        &mut self,
        dest: T::NodeAddress,
        latency: u16,
        link: &T::Link,
        now: Duration,
    ) -> Result<(), RoutingError<T>> {
        let Some(link_latency) = self.ports.latency_of(link) else {
            warn!("{:?} got an advertisement for {:?} over {:?}, which is not up", self.address, dest, link);
            return Err(RoutingError::LinkNotUp { link: link.clone() });
        };
        let candidate = sum_inf(latency, link_latency);

        let accept = match self.table.get(&dest) {
            None => true,
            // the next hop is authoritative, worse routes and withdrawals are taken as-is
            Some(current) if current.link == *link => true,
            Some(current) => candidate < current.latency,
        };
        if !accept {
            return Ok(());
        }

        debug!("{:?} routes {:?} via {:?} with latency {candidate}", self.address, dest, link);
        self.table.insert(TableEntry {
            dest,
            link: link.clone(),
            latency: candidate,
            expiry: Expiry::At(now + self.params.route_ttl),
        });
        self.send_routes(false, None);
        Ok(())
    }

    /// Installs a route to a directly attached host, it never expires
    pub fn add_static_route(&mut self, host: T::NodeAddress, link: &T::Link) -> Result<(), RoutingError<T>> {
        let Some(latency) = self.ports.latency_of(link) else {
            return Err(RoutingError::LinkNotUp { link: link.clone() });
        };
        debug!("{:?} attached host {:?} on {:?}", self.address, host, link);
        self.table.insert(TableEntry {
            dest: host,
            link: link.clone(),
            latency,
            expiry: Expiry::Forever,
        });
        Ok(())
    }

    pub fn handle_link_up(&mut self, link: T::Link, latency: u16) {
        info!("{:?} link {:?} is up with latency {latency}", self.address, link);
        self.ports.add_port(link.clone(), latency);
        if self.params.send_on_link_up {
            self.send_routes(true, Some(&link));
        }
    }

    pub fn handle_link_down(&mut self, link: &T::Link, now: Duration) {
        if !self.ports.remove_port(link) {
            warn!("{:?} link {:?} went down, but it was not up", self.address, link);
            return;
        }
        info!("{:?} link {:?} is down", self.address, link);

        let affected = self.table.routed_via(link);
        if affected.is_empty() {
            return;
        }
        if self.params.poison_on_link_down {
            let expiry = Expiry::At(now + self.params.route_ttl);
            for dest in &affected {
                if let Some(entry) = self.table.get_mut(dest) {
                    entry.latency = INF;
                    entry.expiry = expiry;
                }
            }
            self.send_routes(false, None);
        } else {
            for dest in affected {
                info!("{:?} removing route to {:?}", self.address, dest);
                self.table.remove(&dest);
            }
        }
    }
    // endregion

    // region Forwarding

    /// Forwards a data packet along the table, returns the link it was sent on.
    /// Packets without a usable route are dropped.
    pub fn forward(&mut self, destination: T::NodeAddress, payload: Vec<u8>) -> Option<T::Link> {
        let link = match self.table.get(&destination) {
            Some(entry) if entry.is_reachable() => entry.link.clone(),
            _ => {
                debug!("{:?} dropped a packet for {:?}, no route", self.address, destination);
                return None;
            }
        };
        self.write_packet(link.clone(), Packet::Data { destination, payload });
        Some(link)
    }
    // endregion

    // region Expiration

    /// Removes, or poisons, every route that has expired at `now`.
    /// A poisoned placeholder is kept for one more TTL, after which it is removed.
    pub fn expire_routes(&mut self, now: Duration) {
        let expiry = Expiry::At(now + self.params.route_ttl);
        for dest in self.table.expired(now) {
            if self.params.poison_expired {
                if let Some(entry) = self.table.get_mut(&dest) {
                    if !is_inf(entry.latency) {
                        debug!("{:?} poisoning expired route to {:?}", self.address, dest);
                        entry.latency = INF;
                        entry.expiry = expiry;
                        continue;
                    }
                }
            }
            info!("{:?} removing route to {:?}", self.address, dest);
            self.table.remove(&dest);
        }
    }
    // endregion
}
