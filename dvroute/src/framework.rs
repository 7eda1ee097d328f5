use std::fmt::Debug;
use std::hash::Hash;
use std::time::Duration;

use cfg_if::cfg_if;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "serde")]
use serde_with::{serde_as, DurationSeconds};

use crate::feedback::ConfigError;

pub trait RoutingSystem {
    /// Address of a destination (host) on the routing network, MUST be globally unique.
    /// Routers are named with the same type so that logs can identify them.
    type NodeAddress: Ord + PartialOrd + RootData + RootKey;
    /// Identifier of a local port, only needs to be unique within a single router
    type Link: RootData + RootKey;
    fn config() -> ProtocolParams {
        Default::default()
    }
}

cfg_if! {
    if #[cfg(feature = "serde")] {
        pub trait RootData: Clone + Debug + Serialize + for<'de> Deserialize<'de> + Sized {}
        impl<T: Clone + Debug + Serialize + for<'de> Deserialize<'de> + Sized> RootData for T {}
    } else {
        pub trait RootData: Clone + Debug + Sized {}
        impl<T: Clone + Debug + Sized> RootData for T {}
    }
}
pub trait RootKey: Eq + PartialEq + Hash {}
impl<T: Eq + PartialEq + Hash> RootKey for T {}

/// How a router avoids echoing a route back to the neighbour it was learned from.
/// Split horizon and poison reverse are mutually exclusive, so they live in one enum.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LoopAvoidance {
    /// Advertise every route on every port
    #[default]
    None,
    /// Never advertise a route out of the port it was learned on
    SplitHorizon,
    /// Advertise a route out of the port it was learned on with an infinite latency
    PoisonReverse,
}

impl LoopAvoidance {
    pub fn from_flags(split_horizon: bool, poison_reverse: bool) -> Result<Self, ConfigError> {
        match (split_horizon, poison_reverse) {
            (true, true) => Err(ConfigError::ConflictingLoopAvoidance),
            (true, false) => Ok(LoopAvoidance::SplitHorizon),
            (false, true) => Ok(LoopAvoidance::PoisonReverse),
            (false, false) => Ok(LoopAvoidance::None),
        }
    }
}

/// Protocol Parameters
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "ParamFlags", into = "ParamFlags")
)]
pub struct ProtocolParams {
    /// a learned route times out after this interval without a refresh
    pub route_ttl: Duration,
    /// retention window for withdrawn routes, currently not consulted by the router
    pub garbage_ttl: Duration,
    /// how often the embedder should call `Router::handle_timer`
    pub timer_interval: Duration,
    pub loop_avoidance: LoopAvoidance,
    /// replace expired routes with an INF placeholder instead of dropping them
    pub poison_expired: bool,
    /// send the whole table to a neighbour as soon as its link comes up
    pub send_on_link_up: bool,
    /// poison routes over a link that went down instead of dropping them
    pub poison_on_link_down: bool,
}

impl Default for ProtocolParams {
    fn default() -> Self {
        Self {
            route_ttl: Duration::from_secs(15),
            garbage_ttl: Duration::from_secs(10),
            timer_interval: Duration::from_secs(5),
            loop_avoidance: LoopAvoidance::None,
            poison_expired: false,
            send_on_link_up: false,
            poison_on_link_down: false,
        }
    }
}

impl ProtocolParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.route_ttl.is_zero() {
            return Err(ConfigError::ZeroRouteTtl);
        }
        if self.timer_interval.is_zero() {
            return Err(ConfigError::ZeroTimerInterval);
        }
        Ok(())
    }
}

/// The flat, boolean form of the protocol parameters, as found in config files.
#[cfg_attr(feature = "serde", serde_as)]
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct ParamFlags {
    #[serde_as(as = "DurationSeconds<u64>")]
    pub route_ttl: Duration,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub garbage_ttl: Duration,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub timer_interval: Duration,
    pub split_horizon: bool,
    pub poison_reverse: bool,
    pub poison_expired: bool,
    pub send_on_link_up: bool,
    pub poison_on_link_down: bool,
}

impl Default for ParamFlags {
    fn default() -> Self {
        ProtocolParams::default().into()
    }
}

impl TryFrom<ParamFlags> for ProtocolParams {
    type Error = ConfigError;

    fn try_from(flags: ParamFlags) -> Result<Self, Self::Error> {
        let params = ProtocolParams {
            route_ttl: flags.route_ttl,
            garbage_ttl: flags.garbage_ttl,
            timer_interval: flags.timer_interval,
            loop_avoidance: LoopAvoidance::from_flags(flags.split_horizon, flags.poison_reverse)?,
            poison_expired: flags.poison_expired,
            send_on_link_up: flags.send_on_link_up,
            poison_on_link_down: flags.poison_on_link_down,
        };
        params.validate()?;
        Ok(params)
    }
}

impl From<ProtocolParams> for ParamFlags {
    fn from(params: ProtocolParams) -> Self {
        Self {
            route_ttl: params.route_ttl,
            garbage_ttl: params.garbage_ttl,
            timer_interval: params.timer_interval,
            split_horizon: params.loop_avoidance == LoopAvoidance::SplitHorizon,
            poison_reverse: params.loop_avoidance == LoopAvoidance::PoisonReverse,
            poison_expired: params.poison_expired,
            send_on_link_up: params.send_on_link_up,
            poison_on_link_down: params.poison_on_link_down,
        }
    }
}
