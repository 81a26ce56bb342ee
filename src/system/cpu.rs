use std::io;
use std::thread;
use std::time::Instant;

use sysinfo::System;

use super::platform::{self, CpuTimes};
use super::snapshot::{CpuSample, CpuSnapshot};
use super::{Collect, Collected, round_pct};
use crate::error::{CollectError, Resource};

/// Where per-core cumulative time counters come from.
pub trait CpuSource: Send {
    fn per_core_times(&mut self) -> Result<Vec<CpuTimes>, CollectError>;
}

/// Reads the platform breakdown, switching to sysinfo usage where the
/// platform has none.
#[derive(Default)]
pub struct HostCpuSource {
    fallback: Option<SysinfoCpuTimes>,
}

impl CpuSource for HostCpuSource {
    fn per_core_times(&mut self) -> Result<Vec<CpuTimes>, CollectError> {
        if let Some(fallback) = self.fallback.as_mut() {
            return fallback.sample();
        }
        match platform::cpu_times() {
            Ok(cores) => Ok(cores),
            Err(err) if err.kind() == io::ErrorKind::Unsupported => {
                tracing::debug!(reason = %err, "using sysinfo CPU usage");
                self.fallback.insert(SysinfoCpuTimes::new()).sample()
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// Synthesizes busy/idle counters from sysinfo usage over wall time.
///
/// Busy time is attributed to `user`; there is no system/idle split to report.
/// sysinfo keeps no boot-time totals, so the first sample covers one
/// [`sysinfo::MINIMUM_CPU_UPDATE_INTERVAL`].
struct SysinfoCpuTimes {
    sys: System,
    last_refresh: Option<Instant>,
    totals: Vec<CpuTimes>,
}

impl SysinfoCpuTimes {
    fn new() -> Self {
        SysinfoCpuTimes {
            sys: System::new(),
            last_refresh: None,
            totals: Vec::new(),
        }
    }

    fn sample(&mut self) -> Result<Vec<CpuTimes>, CollectError> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(CollectError::unexpected(
                "CPU statistics are not supported on this platform",
            ));
        }
        let elapsed = match self.last_refresh {
            Some(at) => {
                self.sys.refresh_cpu_usage();
                at.elapsed()
            }
            None => {
                // usage is only meaningful between two refreshes
                self.sys.refresh_cpu_usage();
                thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
                self.sys.refresh_cpu_usage();
                sysinfo::MINIMUM_CPU_UPDATE_INTERVAL
            }
        };
        self.last_refresh = Some(Instant::now());

        let usages: Vec<f32> = self.sys.cpus().iter().map(|cpu| cpu.cpu_usage()).collect();
        if usages.is_empty() {
            return Err(CollectError::unexpected("no logical cores reported"));
        }
        accumulate_usage(&mut self.totals, &usages, elapsed.as_millis() as u64);
        Ok(self.totals.clone())
    }
}

/// Splits `elapsed_ms` of wall time per core into busy and idle counters.
fn accumulate_usage(totals: &mut Vec<CpuTimes>, usages: &[f32], elapsed_ms: u64) {
    totals.resize(usages.len(), CpuTimes::default());
    for (totals, usage) in totals.iter_mut().zip(usages) {
        let usage = f64::from(*usage).clamp(0.0, 100.0);
        let busy = (usage / 100.0 * elapsed_ms as f64).round() as u64;
        totals.user += busy;
        totals.idle += elapsed_ms.saturating_sub(busy);
    }
}

/// Counters from the previous collection.
///
/// Empty before the first call, in which case percentages cover the time
/// since boot. Afterwards they cover the time since the previous call.
#[derive(Debug, Default, Clone)]
pub struct CpuBaseline {
    previous: Vec<CpuTimes>,
}

impl CpuBaseline {
    pub fn is_primed(&self) -> bool {
        !self.previous.is_empty()
    }

    /// Converts fresh counters to percentages and keeps them for next time.
    pub fn advance(&mut self, current: Vec<CpuTimes>) -> CpuSnapshot {
        let zero = CpuTimes::default();
        let cores = current
            .iter()
            .enumerate()
            .map(|(index, now)| {
                // A core missing from the baseline was just brought online.
                let before = self.previous.get(index).unwrap_or(&zero);
                time_percentages(index as u32 + 1, before, now)
            })
            .collect();
        self.previous = current;
        CpuSnapshot::new(cores)
    }
}

fn time_percentages(core_id: u32, before: &CpuTimes, now: &CpuTimes) -> CpuSample {
    let delta = |then: u64, current: u64| current.saturating_sub(then) as f64;
    let user = delta(before.user, now.user);
    let nice = delta(before.nice, now.nice);
    let system = delta(before.system, now.system);
    let idle = delta(before.idle, now.idle);
    let iowait = delta(before.iowait, now.iowait);
    let irq = delta(before.irq, now.irq);
    let softirq = delta(before.softirq, now.softirq);
    let steal = delta(before.steal, now.steal);
    let guest = delta(before.guest, now.guest);
    let guest_nice = delta(before.guest_nice, now.guest_nice);

    // guest time is already counted in user/nice
    let total = user + nice + system + idle + iowait + irq + softirq + steal;
    let pct = |value: f64| {
        if total > 0.0 {
            round_pct(value / total * 100.0)
        } else {
            0.0
        }
    };
    let extra = |value: f64| now.detailed.then(|| pct(value));

    CpuSample {
        core_id,
        user_pct: pct(user),
        system_pct: pct(system),
        idle_pct: pct(idle),
        nice_pct: extra(nice),
        iowait_pct: extra(iowait),
        irq_pct: extra(irq),
        softirq_pct: extra(softirq),
        steal_pct: extra(steal),
        guest_pct: extra(guest),
        guest_nice_pct: extra(guest_nice),
    }
}

pub struct CpuCollector {
    source: Box<dyn CpuSource>,
    baseline: CpuBaseline,
}

impl CpuCollector {
    pub fn new(source: Box<dyn CpuSource>) -> Self {
        CpuCollector {
            source,
            baseline: CpuBaseline::default(),
        }
    }

    pub fn host() -> Self {
        Self::new(Box::new(HostCpuSource::default()))
    }

    pub fn baseline(&self) -> &CpuBaseline {
        &self.baseline
    }
}

impl Collect for CpuCollector {
    type Output = CpuSnapshot;
    const RESOURCE: Resource = Resource::Cpu;

    fn collect(&mut self) -> Collected<CpuSnapshot> {
        let _span = tracing::debug_span!("collector.cpu").entered();
        match self.source.per_core_times() {
            Ok(cores) => Collected::Ok(self.baseline.advance(cores)),
            Err(err) => Collected::degraded(Self::RESOURCE, err),
        }
    }
}
