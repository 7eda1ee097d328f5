use crate::router::INF;
use std::cmp::min;

/// Adds two latencies, saturating at INF
///
/// # Arguments
///
/// * `cost_a`: First latency
/// * `cost_b`: Second latency
///
/// returns: u16
///
/// # Examples
///
/// ```
/// use dvroute::router::INF;
/// assert_eq!(dvroute::util::sum_inf(3, 4), 7);
/// assert_eq!(dvroute::util::sum_inf(INF, 1), INF);
/// assert_eq!(dvroute::util::sum_inf(10, 10), INF);
/// assert_eq!(dvroute::util::sum_inf(u16::MAX, u16::MAX), INF);
/// ```
pub fn sum_inf(cost_a: u16, cost_b: u16) -> u16 {
    if is_inf(cost_a) || is_inf(cost_b) {
        INF
    } else {
        min(INF as u32, cost_a as u32 + cost_b as u32) as u16
    }
}

/// Any latency at or above INF means the destination is unreachable
pub fn is_inf(cost: u16) -> bool {
    cost >= INF
}
