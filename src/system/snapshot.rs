use std::collections::BTreeMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Percentage-of-time breakdown for one logical core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpuSample {
    /// Ordinal in OS enumeration order, starting at 1.
    pub core_id: u32,
    pub user_pct: f64,
    pub system_pct: f64,
    pub idle_pct: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nice_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iowait_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub irq_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub softirq_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steal_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_nice_pct: Option<f64>,
}

impl CpuSample {
    pub fn label(&self) -> String {
        format!("cpu{}", self.core_id)
    }
}

/// Per-core samples keyed by `cpu1`, `cpu2`, ... in core order.
///
/// Serialized as a JSON object whose key order follows the cores, which a
/// sorted map would not preserve past `cpu9`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CpuSnapshot {
    cores: Vec<CpuSample>,
}

impl CpuSnapshot {
    pub fn new(cores: Vec<CpuSample>) -> Self {
        CpuSnapshot { cores }
    }

    pub fn cores(&self) -> &[CpuSample] {
        &self.cores
    }

    pub fn len(&self) -> usize {
        self.cores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cores.is_empty()
    }
}

impl Serialize for CpuSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cores.len()))?;
        for sample in &self.cores {
            map.serialize_entry(&sample.label(), sample)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CpuSnapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CoresVisitor;

        impl<'de> Visitor<'de> for CoresVisitor {
            type Value = CpuSnapshot;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of core labels to CPU samples")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut cores = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((_label, sample)) = access.next_entry::<String, CpuSample>()? {
                    cores.push(sample);
                }
                Ok(CpuSnapshot { cores })
            }
        }

        deserializer.deserialize_map(CoresVisitor)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VirtualMemory {
    pub total: u64,
    pub available: u64,
    pub percent: f64,
}

impl VirtualMemory {
    pub fn used(&self) -> u64 {
        self.total.saturating_sub(self.available)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapMemory {
    pub total: u64,
    pub available: u64,
    pub free: u64,
    pub percent: f64,
}

impl SwapMemory {
    pub fn used(&self) -> u64 {
        self.total.saturating_sub(self.free)
    }
}

/// RAM and swap as sibling entries; both absent when collection failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemorySnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<VirtualMemory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swap: Option<SwapMemory>,
}

impl MemorySnapshot {
    pub fn is_empty(&self) -> bool {
        self.memory.is_none() && self.swap.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskUsage {
    pub device: String,
    pub fstype: String,
    pub options: String,
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub percent: f64,
}

/// Usage per mount point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiskSnapshot {
    pub partitions: BTreeMap<String, DiskUsage>,
}

impl DiskSnapshot {
    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetCounters {
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub packets_sent: u64,
    pub packets_received: u64,
}

/// OS-wide network counters since boot, absent when collection failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    #[serde(flatten)]
    pub counters: Option<NetCounters>,
}

impl NetworkSnapshot {
    pub fn is_empty(&self) -> bool {
        self.counters.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemSnapshot {
    pub timestamp: String,
    pub cpu: CpuSnapshot,
    pub memory: MemorySnapshot,
    pub disk: DiskSnapshot,
    pub network: NetworkSnapshot,
}
