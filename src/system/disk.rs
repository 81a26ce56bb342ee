use std::collections::HashMap;
use std::collections::btree_map::Entry;

use sysinfo::{DiskRefreshKind, Disks};

use super::platform;
use super::snapshot::{DiskSnapshot, DiskUsage};
use super::{Collect, Collected, percent_of};
use crate::diagnostics::Diagnostic;
use crate::error::{CollectError, Resource};

/// A mounted partition as enumerated, before its usage is queried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    pub device: String,
    pub mount_point: String,
    pub fstype: String,
    pub options: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageCounters {
    pub total: u64,
    /// Space available to unprivileged users.
    pub free: u64,
}

/// Partition enumeration plus an independent usage query per mount point.
pub trait DiskSource: Send {
    fn partitions(&mut self) -> Result<Vec<Partition>, CollectError>;
    fn usage(&mut self, partition: &Partition) -> Result<UsageCounters, CollectError>;
}

pub struct HostDiskSource {
    disks: Disks,
}

impl Default for HostDiskSource {
    fn default() -> Self {
        HostDiskSource {
            disks: Disks::new(),
        }
    }
}

impl DiskSource for HostDiskSource {
    fn partitions(&mut self) -> Result<Vec<Partition>, CollectError> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(CollectError::unexpected(
                "disk statistics are not supported on this platform",
            ));
        }
        self.disks =
            Disks::new_with_refreshed_list_specifics(DiskRefreshKind::nothing().with_storage());
        let mount_options = match platform::mount_options() {
            Ok(options) => options,
            Err(err) => {
                tracing::debug!(reason = %err, "mount options unavailable");
                HashMap::new()
            }
        };

        Ok(self
            .disks
            .list()
            .iter()
            .map(|disk| {
                let mount_point = disk.mount_point().to_string_lossy().to_string();
                let options = mount_options
                    .get(&mount_point)
                    .cloned()
                    .unwrap_or_else(|| if disk.is_read_only() { "ro" } else { "rw" }.to_string());
                Partition {
                    device: disk.name().to_string_lossy().to_string(),
                    fstype: disk.file_system().to_string_lossy().to_string(),
                    mount_point,
                    options,
                }
            })
            .collect())
    }

    fn usage(&mut self, partition: &Partition) -> Result<UsageCounters, CollectError> {
        let disk = self
            .disks
            .list_mut()
            .iter_mut()
            .find(|disk| disk.mount_point().to_string_lossy() == partition.mount_point.as_str())
            .ok_or_else(|| CollectError::unexpected("mount point disappeared"))?;
        if !disk.refresh_specifics(DiskRefreshKind::nothing().with_storage()) {
            return Err(CollectError::unexpected("usage query failed"));
        }
        usage_from_capacity(disk.total_space(), disk.available_space())
    }
}

/// sysinfo leaves capacity at zero instead of failing when `statvfs` does.
fn usage_from_capacity(total: u64, available: u64) -> Result<UsageCounters, CollectError> {
    if total == 0 {
        return Err(CollectError::unexpected("usage query returned no capacity"));
    }
    Ok(UsageCounters {
        total,
        free: available,
    })
}

/// Partitions dropped before their usage is queried.
#[derive(Debug, Clone, Default)]
pub struct DiskFilter {
    pub exclude_fstypes: Vec<String>,
    pub exclude_mounts: Vec<String>,
}

impl DiskFilter {
    fn excludes(&self, partition: &Partition) -> bool {
        self.exclude_fstypes
            .iter()
            .any(|fstype| fstype.eq_ignore_ascii_case(&partition.fstype))
            || self.exclude_mounts.iter().any(|mount| mount == &partition.mount_point)
    }
}

pub struct DiskCollector {
    source: Box<dyn DiskSource>,
    filter: DiskFilter,
}

impl DiskCollector {
    pub fn new(source: Box<dyn DiskSource>, filter: DiskFilter) -> Self {
        DiskCollector { source, filter }
    }

    pub fn host(filter: DiskFilter) -> Self {
        Self::new(Box::new(HostDiskSource::default()), filter)
    }
}

impl Collect for DiskCollector {
    type Output = DiskSnapshot;
    const RESOURCE: Resource = Resource::Disk;

    fn collect(&mut self) -> Collected<DiskSnapshot> {
        let _span = tracing::debug_span!("collector.disk").entered();
        let partitions = match self.source.partitions() {
            Ok(partitions) => partitions,
            Err(err) => return Collected::degraded(Self::RESOURCE, err),
        };

        let mut snapshot = DiskSnapshot::default();
        let mut skipped = Vec::new();
        for partition in partitions {
            if self.filter.excludes(&partition) {
                continue;
            }
            let Entry::Vacant(slot) = snapshot.partitions.entry(partition.mount_point.clone())
            else {
                tracing::debug!(mount = %partition.mount_point, "duplicate mount point ignored");
                continue;
            };
            match self.source.usage(&partition) {
                Ok(usage) => {
                    let used = usage.total.saturating_sub(usage.free);
                    slot.insert(DiskUsage {
                        device: partition.device,
                        fstype: partition.fstype,
                        options: partition.options,
                        total: usage.total,
                        used,
                        free: usage.free,
                        percent: percent_of(used, usage.total),
                    });
                }
                Err(err) => {
                    skipped.push(Diagnostic::skipped_partition(&partition.mount_point, &err));
                }
            }
        }

        if skipped.is_empty() {
            Collected::Ok(snapshot)
        } else {
            Collected::Partial {
                value: snapshot,
                skipped,
            }
        }
    }
}
