use sysinfo::Networks;

use super::snapshot::{NetCounters, NetworkSnapshot};
use super::{Collect, Collected};
use crate::error::{CollectError, Resource};

/// OS-wide counters since boot, summed over interfaces.
pub trait NetworkSource: Send {
    fn counters(&mut self) -> Result<NetCounters, CollectError>;
}

pub struct HostNetworkSource {
    networks: Networks,
}

impl Default for HostNetworkSource {
    fn default() -> Self {
        HostNetworkSource {
            networks: Networks::new(),
        }
    }
}

impl NetworkSource for HostNetworkSource {
    fn counters(&mut self) -> Result<NetCounters, CollectError> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(CollectError::unexpected(
                "network statistics are not supported on this platform",
            ));
        }
        self.networks.refresh(true);
        if self.networks.is_empty() {
            return Err(CollectError::unexpected("no network interfaces reported"));
        }
        Ok(self
            .networks
            .iter()
            .fold(NetCounters::default(), |acc, (_name, data)| NetCounters {
                bytes_sent: acc.bytes_sent.saturating_add(data.total_transmitted()),
                bytes_received: acc.bytes_received.saturating_add(data.total_received()),
                packets_sent: acc
                    .packets_sent
                    .saturating_add(data.total_packets_transmitted()),
                packets_received: acc
                    .packets_received
                    .saturating_add(data.total_packets_received()),
            }))
    }
}

pub struct NetworkCollector {
    source: Box<dyn NetworkSource>,
}

impl NetworkCollector {
    pub fn new(source: Box<dyn NetworkSource>) -> Self {
        NetworkCollector { source }
    }

    pub fn host() -> Self {
        Self::new(Box::new(HostNetworkSource::default()))
    }
}

impl Collect for NetworkCollector {
    type Output = NetworkSnapshot;
    const RESOURCE: Resource = Resource::Network;

    fn collect(&mut self) -> Collected<NetworkSnapshot> {
        let _span = tracing::debug_span!("collector.network").entered();
        match self.source.counters() {
            Ok(counters) => Collected::Ok(NetworkSnapshot {
                counters: Some(counters),
            }),
            Err(err) => Collected::degraded(Self::RESOURCE, err),
        }
    }
}
