use std::fmt;
use std::io;
use std::time::Duration;

use thiserror::Error;

/// Why a collector (or one of its partitions) produced no data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    AccessDenied,
    TimedOut,
    Unexpected,
}

/// Errors raised while querying the operating system.
///
/// These never escape a collector: they are folded into a
/// [`Collected`](crate::system::Collected) value at the collector boundary.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("{0}")]
    AccessDenied(String),

    #[error("no response within {} ms", .0.as_millis())]
    TimedOut(Duration),

    #[error("{0}")]
    Unexpected(String),
}

impl CollectError {
    pub fn unexpected(detail: impl Into<String>) -> Self {
        CollectError::Unexpected(detail.into())
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            CollectError::AccessDenied(_) => FailureKind::AccessDenied,
            CollectError::TimedOut(_) => FailureKind::TimedOut,
            CollectError::Unexpected(_) => FailureKind::Unexpected,
        }
    }
}

impl From<io::Error> for CollectError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => CollectError::AccessDenied(err.to_string()),
            _ => CollectError::Unexpected(err.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("write failed: {0}")]
    Io(#[from] io::Error),
}

/// The metric category a collector is responsible for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Cpu,
    Memory,
    Disk,
    Network,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::Cpu => "CPU",
            Resource::Memory => "memory",
            Resource::Disk => "disk",
            Resource::Network => "network",
        };
        f.write_str(name)
    }
}
