#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;
use serde::{Deserialize, Serialize};
use dvroute::concepts::packet::{OutboundPacket, Packet};
use dvroute::framework::{ProtocolParams, RoutingSystem};
use dvroute::router::Router;

#[derive(Serialize, Deserialize, Clone)]
pub struct Edge {
    pub a: String,
    pub b: String,
    pub latency: u16,
    pub up: bool,
}

impl Edge {
    fn other_end(&self, node: &str) -> &str {
        if self.a == node { &self.b } else { &self.a }
    }
}

/// A set of routers and hosts joined by links. Every link id doubles as the port id on both ends.
#[derive(Serialize, Deserialize)]
pub struct VirtualSystem {
    pub routers: Vec<Router<VirtualSystem>>,
    pub edges: BTreeMap<i32, Edge>,
    pub hosts: BTreeSet<String>,
    /// in flight: (receiver, link, packet)
    pub packets: Vec<(String, i32, Packet<VirtualSystem>)>,
    /// data packets that reached a host: (host, payload)
    pub delivered: Vec<(String, Vec<u8>)>,
    pub now: Duration,
}

impl VirtualSystem {
    /// * `links`: (link id, router, router, latency)
    /// * `hosts`: (link id, host, router, latency)
    pub fn create(
        nodes: &[&str],
        links: &[(i32, &str, &str, u16)],
        hosts: &[(i32, &str, &str, u16)],
        params: ProtocolParams,
    ) -> VirtualSystem {
        let mut edges = BTreeMap::new();
        for (lid, a, b, latency) in links.iter().chain(hosts) {
            edges.insert(*lid, Edge {
                a: a.to_string(),
                b: b.to_string(),
                latency: *latency,
                up: true,
            });
        }
        let routers: Vec<Router<VirtualSystem>> = nodes.iter().map(|id| {
            let mut router = Router::with_params(id.to_string(), params.clone()).unwrap();
            for (lid, a, b, latency) in links {
                if a == id || b == id {
                    router.handle_link_up(*lid, *latency);
                }
            }
            for (lid, host, attached, latency) in hosts {
                if attached == id {
                    router.handle_link_up(*lid, *latency);
                    router.add_static_route(host.to_string(), lid).unwrap();
                }
            }
            router
        }).collect();
        let mut system = VirtualSystem {
            routers,
            edges,
            hosts: hosts.iter().map(|(_, host, _, _)| host.to_string()).collect(),
            packets: Vec::new(),
            delivered: Vec::new(),
            now: Duration::ZERO,
        };
        system.flush_packets();
        system
    }

    pub fn get_node(&mut self, node: &str) -> &mut Router<Self> {
        self.routers.iter_mut().find(|r| r.address == node).unwrap_or_else(|| panic!("No node {node} found"))
    }

    fn router(&self, node: &str) -> &Router<Self> {
        self.routers.iter().find(|r| r.address == node).unwrap_or_else(|| panic!("No node {node} found"))
    }

    pub fn has_route(&self, cur: &str, dest: &str) -> bool {
        self.router(cur).get_route(&dest.to_string()).is_some()
    }

    pub fn get_next_hop(&self, cur: &str, dest: &str) -> String {
        let route = self.router(cur).get_route(&dest.to_string()).unwrap_or_else(|| panic!("No route found to {dest}"));
        self.edges[&route.link].other_end(cur).to_string()
    }

    pub fn get_latency_to(&self, cur: &str, dest: &str) -> u16 {
        self.router(cur).get_route(&dest.to_string()).unwrap_or_else(|| panic!("No route found to {dest}")).latency
    }

    /// follows next hops from `cur` until `dest` is reached, None if the walk dead-ends or loops
    pub fn trace(&self, cur: &str, dest: &str) -> Option<Vec<String>> {
        let mut path = vec![cur.to_string()];
        let mut node = cur.to_string();
        while node != dest {
            let route = self.router(&node).get_route(&dest.to_string())?;
            if !route.is_reachable() {
                return None;
            }
            node = self.edges[&route.link].other_end(&node).to_string();
            if path.contains(&node) {
                return None;
            }
            path.push(node.clone());
        }
        Some(path)
    }

    /// moves every queued outbound packet onto its link, packets on down links are lost
    pub fn flush_packets(&mut self) {
        for router in &mut self.routers {
            for OutboundPacket { link, packet } in router.outbound_packets.drain(..) {
                let edge = &self.edges[&link];
                if edge.up {
                    self.packets.push((edge.other_end(&router.address).to_string(), link, packet));
                }
            }
        }
    }

    /// delivers everything in flight, returns how many packets were delivered
    pub fn deliver(&mut self) -> usize {
        let packets = std::mem::take(&mut self.packets);
        let count = packets.len();
        for (node, link, packet) in packets {
            if !self.edges[&link].up {
                continue;
            }
            if self.hosts.contains(&node) {
                if let Packet::Data { payload, .. } = packet {
                    self.delivered.push((node, payload));
                }
                continue;
            }
            let now = self.now;
            self.get_node(&node)
                .handle_packet(&packet, &link, now)
                .unwrap_or_else(|err| panic!("{node} rejected a packet: {err}"));
        }
        self.flush_packets();
        count
    }

    /// delivers packets until the network is quiet, returns the number of rounds it took
    pub fn converge(&mut self) -> usize {
        for round in 0..1000 {
            if self.deliver() == 0 {
                return round;
            }
        }
        panic!("network did not converge");
    }

    /// advances the clock by one timer interval and fires every router's timer
    pub fn tick(&mut self) {
        self.now += self.routers[0].params.timer_interval;
        let now = self.now;
        for router in &mut self.routers {
            router.handle_timer(now);
        }
        self.flush_packets();
    }

    pub fn settle_n(&mut self, times: i32) {
        for _ in 0..times {
            self.tick();
            self.converge();
        }
    }

    pub fn update_edge(&mut self, edge_id: i32, latency: u16) {
        let edge = self.edges.get_mut(&edge_id).unwrap();
        edge.latency = latency;
        let ends = [edge.a.clone(), edge.b.clone()];
        for router in &mut self.routers {
            if ends.contains(&router.address) {
                router.handle_link_up(edge_id, latency);
            }
        }
        self.flush_packets();
    }

    pub fn link_down(&mut self, edge_id: i32) {
        let edge = self.edges.get_mut(&edge_id).unwrap();
        edge.up = false;
        let ends = [edge.a.clone(), edge.b.clone()];
        let now = self.now;
        for router in &mut self.routers {
            if ends.contains(&router.address) {
                router.handle_link_down(&edge_id, now);
            }
        }
        self.flush_packets();
    }

    pub fn link_up(&mut self, edge_id: i32) {
        let edge = self.edges.get_mut(&edge_id).unwrap();
        edge.up = true;
        let (ends, latency) = ([edge.a.clone(), edge.b.clone()], edge.latency);
        for router in &mut self.routers {
            if ends.contains(&router.address) {
                router.handle_link_up(edge_id, latency);
            }
        }
        self.flush_packets();
    }

    /// injects a data packet at `from`, returns whether it left the router
    pub fn send_data(&mut self, from: &str, dest: &str, payload: &[u8]) -> bool {
        let sent = self.get_node(from).forward(dest.to_string(), payload.to_vec()).is_some();
        self.flush_packets();
        sent
    }

    pub fn freeze(&mut self) -> String {
        serde_json::to_string(&self).unwrap()
    }

    pub fn restore(state: String) -> VirtualSystem {
        serde_json::from_str(&state).unwrap()
    }
}

impl RoutingSystem for VirtualSystem {
    type NodeAddress = String;
    type Link = i32;
}
