use std::collections::HashMap;
use std::io;

/// Cumulative time counters for one logical core, in clock ticks.
///
/// `detailed` is set when the platform reports the full breakdown beyond
/// user/system/idle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CpuTimes {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
    pub steal: u64,
    pub guest: u64,
    pub guest_nice: u64,
    pub detailed: bool,
}

pub trait PlatformExtensions {
    /// Per-core counters in OS enumeration order.
    fn cpu_times() -> io::Result<Vec<CpuTimes>>;
    /// Mount options keyed by mount point.
    fn mount_options() -> io::Result<HashMap<String, String>>;
}

#[cfg(target_os = "linux")]
mod linux;
#[cfg(not(target_os = "linux"))]
mod fallback;

#[cfg(target_os = "linux")]
use linux as platform_impl;
#[cfg(not(target_os = "linux"))]
use fallback as platform_impl;

/// Returns `ErrorKind::Unsupported` where no per-core breakdown exists.
pub fn cpu_times() -> io::Result<Vec<CpuTimes>> {
    platform_impl::Platform::cpu_times()
}

/// Returns `ErrorKind::Unsupported` where mount options cannot be read.
pub fn mount_options() -> io::Result<HashMap<String, String>> {
    platform_impl::Platform::mount_options()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrappers_do_not_panic() {
        let _ = cpu_times();
        let _ = mount_options();
    }
}
