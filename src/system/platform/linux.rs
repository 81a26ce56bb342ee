use std::collections::HashMap;
use std::io;

use super::{CpuTimes, PlatformExtensions};

pub struct Platform;

impl PlatformExtensions for Platform {
    fn cpu_times() -> io::Result<Vec<CpuTimes>> {
        let contents = std::fs::read_to_string("/proc/stat")?;
        let cores = parse_proc_stat(&contents);
        if cores.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "/proc/stat lists no per-core counters",
            ));
        }
        Ok(cores)
    }

    fn mount_options() -> io::Result<HashMap<String, String>> {
        let contents = std::fs::read_to_string("/proc/self/mounts")?;
        Ok(parse_mounts(&contents))
    }
}

fn parse_proc_stat(contents: &str) -> Vec<CpuTimes> {
    let mut cores = Vec::new();
    for line in contents.lines() {
        let mut fields = line.split_whitespace();
        let Some(label) = fields.next() else {
            continue;
        };
        // "cpu" alone is the aggregate line; per-core lines are "cpuN".
        let Some(index) = label.strip_prefix("cpu") else {
            continue;
        };
        if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }
        // Older kernels omit the trailing columns.
        let mut values = [0u64; 10];
        for (slot, field) in values.iter_mut().zip(fields) {
            *slot = field.parse().unwrap_or(0);
        }
        cores.push(CpuTimes {
            user: values[0],
            nice: values[1],
            system: values[2],
            idle: values[3],
            iowait: values[4],
            irq: values[5],
            softirq: values[6],
            steal: values[7],
            guest: values[8],
            guest_nice: values[9],
            detailed: true,
        });
    }
    cores
}

fn parse_mounts(contents: &str) -> HashMap<String, String> {
    let mut options = HashMap::new();
    for line in contents.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 4 {
            continue;
        }
        // Later entries shadow earlier ones mounted at the same path.
        options.insert(unescape_mount_field(fields[1]), fields[3].to_string());
    }
    options
}

/// Decodes the `\040`-style octal escapes the kernel uses for whitespace.
fn unescape_mount_field(field: &str) -> String {
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let octal = bytes.get(i + 1..i + 4).filter(|digits| {
            bytes[i] == b'\\' && digits.iter().all(|d| (b'0'..=b'7').contains(d))
        });
        match octal {
            Some(digits) => {
                let code = digits.iter().fold(0u32, |acc, d| acc * 8 + u32::from(d - b'0'));
                out.push(code as u8);
                i += 4;
            }
            None => {
                out.push(bytes[i]);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}
