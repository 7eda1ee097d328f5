use std::collections::HashMap;
use std::env;
use std::time::Duration;

use anyhow::{anyhow, Context};
use dvroute::concepts::packet::OutboundPacket;
use dvroute::framework::{ProtocolParams, RoutingSystem};
use dvroute::router::{Router, INF};
use log::{info, warn};
use simplelog::*;

struct LineSystem {}
impl RoutingSystem for LineSystem {
    type NodeAddress = String;
    type Link = u32;
}

/// A link between two routers. Link ids double as port ids on both routers.
struct Wire {
    a: String,
    b: String,
    latency: u16,
    up: bool,
}

struct Line {
    routers: HashMap<String, Router<LineSystem>>,
    wires: HashMap<u32, Wire>,
    now: Duration,
}

impl Line {
    /// r0 - r1 - ... - r(n-1), with host h(i) hanging off every router
    fn build(n: u32, params: &ProtocolParams) -> anyhow::Result<Line> {
        let mut line = Line {
            routers: HashMap::new(),
            wires: HashMap::new(),
            now: Duration::ZERO,
        };
        for i in 0..n {
            let name = format!("r{i}");
            let mut router = Router::with_params(name.clone(), params.clone())?;
            let host_link = 1000 + i;
            router.handle_link_up(host_link, 1);
            router.add_static_route(format!("h{i}"), &host_link)?;
            line.routers.insert(name, router);
        }
        for i in 1..n {
            let wire = Wire {
                a: format!("r{}", i - 1),
                b: format!("r{i}"),
                latency: 1 + i as u16 % 2,
                up: true,
            };
            for end in [&wire.a, &wire.b] {
                line.routers.get_mut(end).ok_or_else(|| anyhow!("no router named {end}"))?
                    .handle_link_up(i, wire.latency);
            }
            line.wires.insert(i, wire);
        }
        Ok(line)
    }

    fn router(&mut self, name: &str) -> anyhow::Result<&mut Router<LineSystem>> {
        self.routers.get_mut(name).ok_or_else(|| anyhow!("no router named {name}"))
    }

    /// delivers packets until every router is quiet
    fn exchange(&mut self) -> anyhow::Result<usize> {
        let mut delivered = 0;
        loop {
            let mut in_flight = Vec::new();
            for (name, router) in &mut self.routers {
                for OutboundPacket { link, packet } in router.outbound_packets.drain(..) {
                    // packets on host links are consumed by the host
                    let Some(wire) = self.wires.get(&link) else { continue };
                    if !wire.up {
                        continue;
                    }
                    let peer = if wire.a == *name { wire.b.clone() } else { wire.a.clone() };
                    in_flight.push((peer, link, packet));
                }
            }
            if in_flight.is_empty() {
                return Ok(delivered);
            }
            delivered += in_flight.len();
            let now = self.now;
            for (peer, link, packet) in in_flight {
                if let Err(err) = self.router(&peer)?.handle_packet(&packet, &link, now) {
                    warn!("{peer} rejected a packet: {err}");
                }
            }
        }
    }

    fn tick(&mut self, interval: Duration) -> anyhow::Result<usize> {
        self.now += interval;
        let now = self.now;
        for router in self.routers.values_mut() {
            router.handle_timer(now);
        }
        self.exchange()
    }

    fn cut(&mut self, link: u32) -> anyhow::Result<()> {
        let wire = self.wires.get_mut(&link).ok_or_else(|| anyhow!("no link {link}"))?;
        wire.up = false;
        let ends = [wire.a.clone(), wire.b.clone()];
        let now = self.now;
        for end in ends {
            self.router(&end)?.handle_link_down(&link, now);
        }
        Ok(())
    }

    fn log_table(&self, name: &str) {
        let Some(router) = self.routers.get(name) else { return };
        let mut entries: Vec<_> = router.table.entries().collect();
        entries.sort_by(|a, b| a.dest.cmp(&b.dest));
        info!("Routes at {name} (t={}s):", self.now.as_secs());
        for entry in entries {
            let latency = if entry.latency >= INF { "inf".to_string() } else { entry.latency.to_string() };
            info!(" - {}: latency: {latency}, link: {}, latency of link: {:?}", entry.dest, entry.link,
                router.ports.latency_of(&entry.link));
        }
    }
}

fn load_params() -> anyhow::Result<ProtocolParams> {
    match env::args().nth(1) {
        Some(path) => {
            let raw = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
            let params = serde_json::from_str(&raw).with_context(|| format!("parsing {path}"))?;
            Ok(params)
        }
        None => Ok(ProtocolParams::default()),
    }
}

fn main() -> anyhow::Result<()> {
    TermLogger::init(LevelFilter::Info, Config::default(), TerminalMode::Mixed, ColorChoice::Auto)
        .map_err(|err| anyhow!("Failed to init logger: {err}"))?;

    let params = load_params()?;
    info!("Using {params:?}");
    let mut line = Line::build(5, &params)?;

    for _ in 0..3 {
        let sent = line.tick(params.timer_interval)?;
        info!("t={}s: {sent} packets exchanged", line.now.as_secs());
    }
    line.log_table("r0");

    info!("Cutting the link between r2 and r3");
    line.cut(3)?;
    line.exchange()?;
    line.log_table("r0");

    for _ in 0..6 {
        line.tick(params.timer_interval)?;
    }
    line.log_table("r0");
    Ok(())
}
