use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use hostsnap::diagnostics::{Diagnostic, DiagnosticSink};
use hostsnap::render::{render_json, render_table};
use hostsnap::system::SystemSnapshot;
use hostsnap::system::snapshot::{
    CpuSample, CpuSnapshot, DiskSnapshot, DiskUsage, MemorySnapshot, NetCounters,
    NetworkSnapshot, SwapMemory, VirtualMemory,
};
use std::hint::black_box;

struct Discard;

impl DiagnosticSink for Discard {
    fn emit(&self, _diagnostic: &Diagnostic) {}
}

fn make_snapshot(n: usize) -> SystemSnapshot {
    let cores = (0..n)
        .map(|i| CpuSample {
            core_id: i as u32 + 1,
            user_pct: (i % 50) as f64,
            system_pct: (i % 10) as f64,
            idle_pct: 100.0 - (i % 60) as f64,
            nice_pct: Some(0.0),
            iowait_pct: Some(0.1),
            irq_pct: Some(0.0),
            softirq_pct: Some(0.0),
            steal_pct: Some(0.0),
            guest_pct: None,
            guest_nice_pct: None,
        })
        .collect();

    let mut disk = DiskSnapshot::default();
    for i in 0..n {
        let total = (i as u64 + 1) << 30;
        disk.partitions.insert(
            format!("/mnt/volume_{i}"),
            DiskUsage {
                device: format!("/dev/sd{i}"),
                fstype: "ext4".to_string(),
                options: "rw,relatime".to_string(),
                total,
                used: total / 2,
                free: total - total / 2,
                percent: 50.0,
            },
        );
    }

    SystemSnapshot {
        timestamp: "2026-10-16T09:30:00+02:00".to_string(),
        cpu: CpuSnapshot::new(cores),
        memory: MemorySnapshot {
            memory: Some(VirtualMemory {
                total: 64 << 30,
                available: 40 << 30,
                percent: 37.5,
            }),
            swap: Some(SwapMemory {
                total: 8 << 30,
                available: 6 << 30,
                free: 6 << 30,
                percent: 25.0,
            }),
        },
        disk,
        network: NetworkSnapshot {
            counters: Some(NetCounters {
                bytes_sent: 1 << 40,
                bytes_received: 1 << 41,
                packets_sent: 1 << 30,
                packets_received: 1 << 31,
            }),
        },
    }
}

fn bench_render_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_table");
    for size in [8usize, 64, 256] {
        let snapshot = make_snapshot(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &snapshot, |b, snapshot| {
            b.iter(|| {
                let mut out = Vec::with_capacity(64 * 1024);
                render_table(black_box(snapshot), &mut out, &Discard);
                black_box(out)
            })
        });
    }
    group.finish();
}

fn bench_render_json(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_json");
    for size in [8usize, 64, 256] {
        let snapshot = make_snapshot(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &snapshot, |b, snapshot| {
            b.iter(|| {
                let mut out = Vec::with_capacity(64 * 1024);
                black_box(render_json(black_box(snapshot), &mut out, &Discard))
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_render_table, bench_render_json);
criterion_main!(benches);
