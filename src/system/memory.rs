use sysinfo::{MemoryRefreshKind, System};

use super::snapshot::{MemorySnapshot, SwapMemory, VirtualMemory};
use super::{Collect, Collected, percent_of};
use crate::error::{CollectError, Resource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RamCounters {
    pub total: u64,
    pub available: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapCounters {
    pub total: u64,
    pub free: u64,
}

/// RAM and swap queries; neither depends on the other.
pub trait MemorySource: Send {
    fn ram(&mut self) -> Result<RamCounters, CollectError>;
    fn swap(&mut self) -> Result<SwapCounters, CollectError>;
}

pub struct HostMemorySource {
    sys: System,
}

impl Default for HostMemorySource {
    fn default() -> Self {
        HostMemorySource { sys: System::new() }
    }
}

impl MemorySource for HostMemorySource {
    fn ram(&mut self) -> Result<RamCounters, CollectError> {
        self.sys
            .refresh_memory_specifics(MemoryRefreshKind::nothing().with_ram());
        let total = self.sys.total_memory();
        // sysinfo reports zero rather than an error when the query fails.
        if total == 0 {
            return Err(CollectError::unexpected("total memory reported as zero"));
        }
        Ok(RamCounters {
            total,
            available: self.sys.available_memory(),
        })
    }

    fn swap(&mut self) -> Result<SwapCounters, CollectError> {
        self.sys
            .refresh_memory_specifics(MemoryRefreshKind::nothing().with_swap());
        Ok(SwapCounters {
            total: self.sys.total_swap(),
            free: self.sys.free_swap(),
        })
    }
}

pub struct MemoryCollector {
    source: Box<dyn MemorySource>,
}

impl MemoryCollector {
    pub fn new(source: Box<dyn MemorySource>) -> Self {
        MemoryCollector { source }
    }

    pub fn host() -> Self {
        Self::new(Box::new(HostMemorySource::default()))
    }

    fn query(&mut self) -> Result<MemorySnapshot, CollectError> {
        let ram = self.source.ram()?;
        let swap = self.source.swap()?;
        let used_ram = ram.total.saturating_sub(ram.available);
        let used_swap = swap.total.saturating_sub(swap.free);
        Ok(MemorySnapshot {
            memory: Some(VirtualMemory {
                total: ram.total,
                available: ram.available,
                percent: percent_of(used_ram, ram.total),
            }),
            swap: Some(SwapMemory {
                total: swap.total,
                // the OS exposes no separate "available" figure for swap
                available: swap.free,
                free: swap.free,
                percent: percent_of(used_swap, swap.total),
            }),
        })
    }
}

impl Collect for MemoryCollector {
    type Output = MemorySnapshot;
    const RESOURCE: Resource = Resource::Memory;

    fn collect(&mut self) -> Collected<MemorySnapshot> {
        let _span = tracing::debug_span!("collector.memory").entered();
        match self.query() {
            Ok(snapshot) => Collected::Ok(snapshot),
            Err(err) => Collected::degraded(Self::RESOURCE, err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::testing::RecordingSink;
    use crate::error::FailureKind;

    struct FixedSource {
        ram: fn() -> Result<RamCounters, CollectError>,
        swap: fn() -> Result<SwapCounters, CollectError>,
    }

    impl MemorySource for FixedSource {
        fn ram(&mut self) -> Result<RamCounters, CollectError> {
            (self.ram)()
        }

        fn swap(&mut self) -> Result<SwapCounters, CollectError> {
            (self.swap)()
        }
    }

    fn eight_gib_half_used() -> Result<RamCounters, CollectError> {
        Ok(RamCounters {
            total: 8_589_934_592,
            available: 4_294_967_296,
        })
    }

    fn two_gib_swap_quarter_used() -> Result<SwapCounters, CollectError> {
        Ok(SwapCounters {
            total: 2_147_483_648,
            free: 1_610_612_736,
        })
    }

    #[test]
    fn computes_percentages() {
        let mut memory = MemoryCollector::new(Box::new(FixedSource {
            ram: eight_gib_half_used,
            swap: two_gib_swap_quarter_used,
        }));
        let snapshot = memory.collect().into_value();
        let ram = snapshot.memory.unwrap();
        assert_eq!(ram.percent, 50.0);
        assert_eq!(ram.used(), 4_294_967_296);
        let swap = snapshot.swap.unwrap();
        assert_eq!(swap.percent, 25.0);
        assert_eq!(swap.available, swap.free);
    }

    #[test]
    fn no_swap_is_zero_percent() {
        let mut memory = MemoryCollector::new(Box::new(FixedSource {
            ram: eight_gib_half_used,
            swap: || Ok(SwapCounters { total: 0, free: 0 }),
        }));
        let snapshot = memory.collect().into_value();
        assert_eq!(snapshot.swap.unwrap().percent, 0.0);
    }

    #[test]
    fn swap_access_denied_degrades_whole_snapshot() {
        let sink = RecordingSink::default();
        let mut memory = MemoryCollector::new(Box::new(FixedSource {
            ram: eight_gib_half_used,
            swap: || Err(CollectError::AccessDenied("swap is private".to_string())),
        }));
        let collected = memory.collect();
        assert_eq!(collected.failure_kind(), Some(FailureKind::AccessDenied));
        assert!(collected.report(&sink).is_empty());
        assert_eq!(sink.diagnostics().len(), 1);
        assert_eq!(
            sink.diagnostics()[0].to_string(),
            "Error: Access denied to memory information - swap is private"
        );
    }

    #[test]
    fn generic_failure_degrades_with_one_diagnostic() {
        let sink = RecordingSink::default();
        let mut memory = MemoryCollector::new(Box::new(FixedSource {
            ram: || Err(CollectError::unexpected("meminfo truncated")),
            swap: two_gib_swap_quarter_used,
        }));
        let snapshot = memory.collect().report(&sink);
        assert!(snapshot.is_empty());
        assert_eq!(sink.diagnostics().len(), 1);
    }

    #[test]
    fn host_memory_is_nonzero() {
        let snapshot = MemoryCollector::host().collect().into_value();
        if let Some(ram) = snapshot.memory {
            assert!(ram.total > 0);
            assert!((0.0..=100.0).contains(&ram.percent));
        }
    }
}
