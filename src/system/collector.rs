use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{Local, SecondsFormat};

use super::cpu::CpuCollector;
use super::disk::{DiskCollector, DiskFilter};
use super::memory::MemoryCollector;
use super::network::NetworkCollector;
use super::snapshot::SystemSnapshot;
use super::{Collect, Collected};
use crate::diagnostics::DiagnosticSink;
use crate::error::CollectError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(2000);
/// Shorter limits would time out collectors before their thread starts.
pub const MIN_TIMEOUT: Duration = Duration::from_millis(50);

#[derive(Debug, Clone)]
pub struct CollectorSettings {
    /// Upper bound on each collector's OS queries.
    pub timeout: Duration,
    pub disk_filter: DiskFilter,
}

impl Default for CollectorSettings {
    fn default() -> Self {
        CollectorSettings {
            timeout: DEFAULT_TIMEOUT,
            disk_filter: DiskFilter::default(),
        }
    }
}

/// Runs the four collectors and assembles one snapshot.
///
/// Collector state sits behind a mutex so a task that outlives its timeout
/// can finish in the background without holding up the snapshot.
pub struct Collector {
    cpu: Arc<Mutex<CpuCollector>>,
    memory: Arc<Mutex<MemoryCollector>>,
    disk: Arc<Mutex<DiskCollector>>,
    network: Arc<Mutex<NetworkCollector>>,
    timeout: Duration,
    sink: Arc<dyn DiagnosticSink>,
}

impl Collector {
    pub fn new(
        cpu: CpuCollector,
        memory: MemoryCollector,
        disk: DiskCollector,
        network: NetworkCollector,
        timeout: Duration,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        if timeout < MIN_TIMEOUT {
            tracing::warn!(
                requested_ms = timeout.as_millis() as u64,
                minimum_ms = MIN_TIMEOUT.as_millis() as u64,
                "collector timeout raised to minimum"
            );
        }
        Collector {
            cpu: Arc::new(Mutex::new(cpu)),
            memory: Arc::new(Mutex::new(memory)),
            disk: Arc::new(Mutex::new(disk)),
            network: Arc::new(Mutex::new(network)),
            timeout: timeout.max(MIN_TIMEOUT),
            sink,
        }
    }

    /// Collectors backed by the running host.
    pub fn host(settings: CollectorSettings, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self::new(
            CpuCollector::host(),
            MemoryCollector::host(),
            DiskCollector::host(settings.disk_filter),
            NetworkCollector::host(),
            settings.timeout,
            sink,
        )
    }

    /// Takes a CPU baseline without reporting anything.
    ///
    /// A later [`assemble`](Self::assemble) then reports CPU time since this
    /// call instead of since boot. A failure here will recur, and be
    /// reported, during assembly.
    pub async fn prime_cpu(&self) {
        let primed = run_bounded(Arc::clone(&self.cpu), self.timeout).await;
        tracing::debug!(degraded = primed.is_degraded(), "cpu baseline taken");
    }

    pub async fn assemble(&self) -> SystemSnapshot {
        let timestamp = Local::now().to_rfc3339_opts(SecondsFormat::Secs, false);

        let (cpu, memory, disk, network) = tokio::join!(
            run_bounded(Arc::clone(&self.cpu), self.timeout),
            run_bounded(Arc::clone(&self.memory), self.timeout),
            run_bounded(Arc::clone(&self.disk), self.timeout),
            run_bounded(Arc::clone(&self.network), self.timeout),
        );
        tracing::debug!(
            cpu_degraded = cpu.is_degraded(),
            memory_degraded = memory.is_degraded(),
            disk_degraded = disk.is_degraded(),
            network_degraded = network.is_degraded(),
            "collectors joined"
        );

        let sink = self.sink.as_ref();
        SystemSnapshot {
            timestamp,
            cpu: cpu.report(sink),
            memory: memory.report(sink),
            disk: disk.report(sink),
            network: network.report(sink),
        }
    }
}

/// Runs one collector on the blocking pool, degrading on timeout or panic.
async fn run_bounded<C>(collector: Arc<Mutex<C>>, limit: Duration) -> Collected<C::Output>
where
    C: Collect + 'static,
{
    let task = tokio::task::spawn_blocking(move || match collector.lock() {
        Ok(mut collector) => collector.collect(),
        Err(_) => Collected::degraded(
            C::RESOURCE,
            CollectError::unexpected("collector state poisoned by an earlier panic"),
        ),
    });

    match tokio::time::timeout(limit, task).await {
        Ok(Ok(collected)) => collected,
        Ok(Err(join_err)) => Collected::degraded(
            C::RESOURCE,
            CollectError::unexpected(format!("collector task failed: {join_err}")),
        ),
        Err(_elapsed) => {
            tracing::warn!(
                resource = %C::RESOURCE,
                limit_ms = limit.as_millis() as u64,
                "collector timed out"
            );
            Collected::degraded(C::RESOURCE, CollectError::TimedOut(limit))
        }
    }
}
