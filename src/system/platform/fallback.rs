use std::collections::HashMap;
use std::io;

use super::{CpuTimes, PlatformExtensions};

pub struct Platform;

impl PlatformExtensions for Platform {
    fn cpu_times() -> io::Result<Vec<CpuTimes>> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "per-core time breakdown is not exposed on this platform",
        ))
    }

    fn mount_options() -> io::Result<HashMap<String, String>> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "mount options are not exposed on this platform",
        ))
    }
}
