use educe::Educe;
use thiserror::Error;
use crate::framework::RoutingSystem;

/// Fatal errors raised while constructing a router, these are never recoverable
#[derive(Error, Debug, Clone, Copy, Eq, PartialEq)]
pub enum ConfigError {
    #[error("Split horizon and poison reverse cannot both be enabled.")]
    ConflictingLoopAvoidance,
    #[error("The route TTL must be greater than zero.")]
    ZeroRouteTtl,
    #[error("The timer interval must be greater than zero.")]
    ZeroTimerInterval,
}

/// Raised when the embedder hands the router an event that contradicts its own port state.
/// The router state is left untouched when one of these is returned.
#[derive(Error)]
#[derive(Educe)]
#[educe(Debug(bound()), PartialEq(bound()))]
pub enum RoutingError<T: RoutingSystem + ?Sized> {
    /// The link is not registered as up, so it has no latency and cannot carry routes
    #[error("Link {link:?} is not up.")]
    LinkNotUp {
        link: T::Link
    }
}
