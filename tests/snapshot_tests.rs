use std::sync::Mutex;

use hostsnap::diagnostics::{Diagnostic, DiagnosticSink};
use hostsnap::render::{OutputFormat, json::to_json, render};
use hostsnap::system::SystemSnapshot;
use hostsnap::system::snapshot::{
    CpuSample, CpuSnapshot, DiskSnapshot, DiskUsage, MemorySnapshot, NetCounters,
    NetworkSnapshot, SwapMemory, VirtualMemory,
};
use insta::assert_snapshot;

#[derive(Default)]
struct Collecting(Mutex<Vec<String>>);

impl DiagnosticSink for Collecting {
    fn emit(&self, diagnostic: &Diagnostic) {
        self.0.lock().unwrap().push(diagnostic.to_string());
    }
}

fn core(core_id: u32, user: f64, system: f64, idle: f64) -> CpuSample {
    CpuSample {
        core_id,
        user_pct: user,
        system_pct: system,
        idle_pct: idle,
        nice_pct: None,
        iowait_pct: None,
        irq_pct: None,
        softirq_pct: None,
        steal_pct: None,
        guest_pct: None,
        guest_nice_pct: None,
    }
}

fn disk(device: &str, fstype: &str, total: u64, used: u64, percent: f64) -> DiskUsage {
    DiskUsage {
        device: device.to_string(),
        fstype: fstype.to_string(),
        options: "rw".to_string(),
        total,
        used,
        free: total - used,
        percent,
    }
}

fn fixture() -> SystemSnapshot {
    let mut disk_snapshot = DiskSnapshot::default();
    disk_snapshot.partitions.insert(
        "/boot/efi".to_string(),
        disk("/dev/nvme0n1p1", "vfat", 536_870_912, 6_291_456, 1.2),
    );
    disk_snapshot.partitions.insert(
        "/".to_string(),
        disk("/dev/nvme0n1p2", "ext4", 536_870_912_000, 214_748_364_800, 40.0),
    );

    SystemSnapshot {
        timestamp: "2026-10-16T09:30:00+02:00".to_string(),
        cpu: CpuSnapshot::new(vec![core(1, 12.5, 3.0, 84.5), core(2, 7.0, 2.5, 90.5)]),
        memory: MemorySnapshot {
            memory: Some(VirtualMemory {
                total: 8_589_934_592,
                available: 4_294_967_296,
                percent: 50.0,
            }),
            swap: Some(SwapMemory {
                total: 2_147_483_648,
                available: 1_610_612_736,
                free: 1_610_612_736,
                percent: 25.0,
            }),
        },
        disk: disk_snapshot,
        network: NetworkSnapshot {
            counters: Some(NetCounters {
                bytes_sent: 123_456_789,
                bytes_received: 987_654_321,
                packets_sent: 123_456,
                packets_received: 654_321,
            }),
        },
    }
}

fn degraded() -> SystemSnapshot {
    SystemSnapshot {
        timestamp: "2026-10-16T09:30:00+02:00".to_string(),
        cpu: CpuSnapshot::default(),
        memory: MemorySnapshot::default(),
        disk: DiskSnapshot::default(),
        network: NetworkSnapshot::default(),
    }
}

fn render_to_string(snapshot: &SystemSnapshot, format: OutputFormat) -> String {
    let sink = Collecting::default();
    let mut out = Vec::new();
    assert!(render(snapshot, format, &mut out, &sink));
    assert!(sink.0.lock().unwrap().is_empty());
    String::from_utf8(out).unwrap()
}

#[test]
fn full_snapshot_table() {
    let output = render_to_string(&fixture(), OutputFormat::Table);
    assert_snapshot!("full_snapshot_table", output);
}

#[test]
fn table_lines_have_no_trailing_whitespace() {
    let output = render_to_string(&fixture(), OutputFormat::Table);
    for line in output.lines() {
        assert_eq!(line, line.trim_end(), "trailing whitespace in {line:?}");
    }
}

#[test]
fn json_keys_follow_snapshot_order() {
    let json = to_json(&fixture()).unwrap();
    let positions: Vec<usize> = ["\"timestamp\"", "\"cpu\"", "\"memory\"", "\"disk\"", "\"network\""]
        .iter()
        .map(|key| json.find(key).unwrap())
        .collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    assert!(json.find("\"cpu1\"").unwrap() < json.find("\"cpu2\"").unwrap());
    assert!(json.find("\"/\"").unwrap() < json.find("\"/boot/efi\"").unwrap());
}

#[test]
fn json_output_parses_back_to_the_same_snapshot() {
    let output = render_to_string(&fixture(), OutputFormat::Json);
    assert!(output.ends_with("}\n"));
    let parsed: SystemSnapshot = serde_json::from_str(&output).unwrap();
    assert_eq!(parsed, fixture());
}

#[test]
fn degraded_snapshot_keeps_every_key() {
    let output = render_to_string(&degraded(), OutputFormat::Json);
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["cpu"], serde_json::json!({}));
    assert_eq!(value["memory"], serde_json::json!({}));
    assert_eq!(value["disk"], serde_json::json!({}));
    assert_eq!(value["network"], serde_json::json!({}));
    assert_eq!(value["timestamp"], "2026-10-16T09:30:00+02:00");
}

#[test]
fn degraded_snapshot_table_keeps_every_section() {
    let output = render_to_string(&degraded(), OutputFormat::Table);
    for title in ["CPU Usage", "Memory", "Swap", "Disk Usage", "Network"] {
        assert!(output.contains(&format!("\n{title}\n")), "missing {title}");
    }
}
