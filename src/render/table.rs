use std::io::Write;

use unicode_width::UnicodeWidthStr;

use super::OutputFormat;
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::RenderError;
use crate::format::{format_gb, format_mb, format_percent, truncate_unicode};
use crate::system::SystemSnapshot;

const MAX_PATH_WIDTH: usize = 40;
const COLUMN_GAP: &str = "  ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

/// A plain-text table aligned by display width.
struct TextTable {
    columns: Vec<(&'static str, Align)>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    fn new(columns: &[(&'static str, Align)]) -> Self {
        TextTable {
            columns: columns.to_vec(),
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<String>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    fn lines(&self) -> Vec<String> {
        let mut widths: Vec<usize> = self.columns.iter().map(|(title, _)| title.width()).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.width());
            }
        }

        let header: Vec<&str> = self.columns.iter().map(|(title, _)| *title).collect();
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();

        let mut lines = Vec::with_capacity(self.rows.len() + 2);
        lines.push(self.format_row(header.as_slice(), &widths));
        lines.push(self.format_row(rule.as_slice(), &widths));
        for row in &self.rows {
            lines.push(self.format_row(row.as_slice(), &widths));
        }
        lines
    }

    fn format_row<S: AsRef<str>>(&self, cells: &[S], widths: &[usize]) -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths)
            .zip(&self.columns)
            .map(|((cell, width), (_, align))| pad(cell.as_ref(), *width, *align))
            .collect();
        padded.join(COLUMN_GAP).trim_end().to_string()
    }
}

fn pad(cell: &str, width: usize, align: Align) -> String {
    let fill = " ".repeat(width.saturating_sub(cell.width()));
    match align {
        Align::Left => format!("{cell}{fill}"),
        Align::Right => format!("{fill}{cell}"),
    }
}

fn cpu_table(snapshot: &SystemSnapshot) -> TextTable {
    let mut table = TextTable::new(&[
        ("Core", Align::Left),
        ("User %", Align::Right),
        ("System %", Align::Right),
        ("Idle %", Align::Right),
    ]);
    for core in snapshot.cpu.cores() {
        table.push(vec![
            core.label(),
            format_percent(core.user_pct),
            format_percent(core.system_pct),
            format_percent(core.idle_pct),
        ]);
    }
    table
}

fn memory_table(snapshot: &SystemSnapshot) -> TextTable {
    let mut table = TextTable::new(&[
        ("Total (MB)", Align::Right),
        ("Available (MB)", Align::Right),
        ("Used (MB)", Align::Right),
        ("Percent", Align::Right),
    ]);
    if let Some(ram) = &snapshot.memory.memory {
        table.push(vec![
            format_mb(ram.total),
            format_mb(ram.available),
            format_mb(ram.used()),
            format_percent(ram.percent),
        ]);
    }
    table
}

fn swap_table(snapshot: &SystemSnapshot) -> TextTable {
    let mut table = TextTable::new(&[
        ("Total (MB)", Align::Right),
        ("Used (MB)", Align::Right),
        ("Free (MB)", Align::Right),
        ("Percent", Align::Right),
    ]);
    if let Some(swap) = &snapshot.memory.swap {
        table.push(vec![
            format_mb(swap.total),
            format_mb(swap.used()),
            format_mb(swap.free),
            format_percent(swap.percent),
        ]);
    }
    table
}

fn disk_table(snapshot: &SystemSnapshot) -> TextTable {
    let mut table = TextTable::new(&[
        ("Mount Point", Align::Left),
        ("Filesystem", Align::Left),
        ("Size (GB)", Align::Right),
        ("Used (GB)", Align::Right),
        ("Free (GB)", Align::Right),
        ("Percent", Align::Right),
    ]);
    for (mount_point, usage) in &snapshot.disk.partitions {
        table.push(vec![
            truncate_unicode(mount_point, MAX_PATH_WIDTH),
            truncate_unicode(&usage.fstype, MAX_PATH_WIDTH),
            format_gb(usage.total),
            format_gb(usage.used),
            format_gb(usage.free),
            format_percent(usage.percent),
        ]);
    }
    table
}

fn network_table(snapshot: &SystemSnapshot) -> TextTable {
    let mut table = TextTable::new(&[("Metric", Align::Left), ("Value", Align::Right)]);
    if let Some(net) = &snapshot.network.counters {
        for (metric, value) in [
            ("Bytes Sent", net.bytes_sent),
            ("Bytes Received", net.bytes_received),
            ("Packets Sent", net.packets_sent),
            ("Packets Received", net.packets_received),
        ] {
            table.push(vec![metric.to_string(), value.to_string()]);
        }
    }
    table
}

fn write_section<W: Write>(out: &mut W, title: &str, table: &TextTable) -> Result<(), RenderError> {
    writeln!(out)?;
    writeln!(out, "{title}")?;
    for line in table.lines() {
        writeln!(out, "{line}")?;
    }
    out.flush()?;
    Ok(())
}

fn write_tables<W: Write>(snapshot: &SystemSnapshot, out: &mut W) -> Result<(), RenderError> {
    writeln!(out, "System Snapshot")?;
    writeln!(out, "Captured at: {}", snapshot.timestamp)?;
    out.flush()?;

    write_section(out, "CPU Usage", &cpu_table(snapshot))?;
    write_section(out, "Memory", &memory_table(snapshot))?;
    write_section(out, "Swap", &swap_table(snapshot))?;
    write_section(out, "Disk Usage", &disk_table(snapshot))?;
    write_section(out, "Network", &network_table(snapshot))?;
    Ok(())
}

/// Writes the snapshot as plain-text tables, one section at a time.
///
/// Sections already written stay written if a later one fails. Returns
/// `false` after emitting a diagnostic in that case.
pub fn render_table<W: Write>(
    snapshot: &SystemSnapshot,
    out: &mut W,
    sink: &dyn DiagnosticSink,
) -> bool {
    let _span = tracing::debug_span!("render.table").entered();
    match write_tables(snapshot, out) {
        Ok(()) => true,
        Err(err) => {
            sink.emit(&Diagnostic::render(OutputFormat::Table.label(), &err));
            false
        }
    }
}
