//! Host metric collection.
//!
//! Each collector reads the OS through a narrow source trait and folds every
//! failure into a [`Collected`] value, so no query error ever escapes to the
//! caller. [`Collector`] runs all four and assembles a [`SystemSnapshot`].

pub mod collected;
pub mod collector;
pub mod cpu;
pub mod disk;
pub mod memory;
pub mod network;
pub mod platform;
pub mod snapshot;

pub use collected::Collected;
pub use collector::{Collector, CollectorSettings};
pub use snapshot::SystemSnapshot;

use crate::error::Resource;

/// One category of metrics, queried on demand.
pub trait Collect: Send {
    type Output: Default + Send + 'static;
    const RESOURCE: Resource;

    fn collect(&mut self) -> Collected<Self::Output>;
}

/// Rounds to one decimal place.
pub(crate) fn round_pct(value: f64) -> f64 {
    (value.clamp(0.0, 100.0) * 10.0).round() / 10.0
}

/// `part / whole` as a percentage; zero when `whole` is zero.
pub(crate) fn percent_of(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round_pct(part as f64 / whole as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_of_rounds_and_handles_zero() {
        assert_eq!(percent_of(1, 3), 33.3);
        assert_eq!(percent_of(5, 0), 0.0);
        assert_eq!(percent_of(10, 10), 100.0);
    }
}
