use std::io::stdout;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::Result;
use hostsnap::config::{Config, ConfigError, load_config, load_config_from_path};
use hostsnap::diagnostics::StderrSink;
use hostsnap::logging::init_tracing;
use hostsnap::render::{self, OutputFormat, parse_format};
use hostsnap::system::Collector;

/// How long blocked collector threads may delay process exit.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(100);

#[derive(Parser)]
#[command(
    name = "hostsnap",
    version,
    about = "Point-in-time CPU, memory, disk and network snapshot"
)]
struct Cli {
    /// Output format (defaults to the config file, then `table`)
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Shorthand for `--format json`
    #[arg(long, conflicts_with = "format")]
    json: bool,

    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Per-collector timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Measure CPU over this many milliseconds instead of since boot
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Log filter, e.g. `debug` or `hostsnap=trace`
    #[arg(long)]
    log_level: Option<String>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, default_value_t = false)]
    log_json: bool,
}

fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let (config, config_error) = match load_config_for_cli(&cli) {
        Ok(config) => (config, None),
        Err(err) => (Config::default(), Some(err)),
    };
    init_tracing(
        cli.log_level.as_deref().unwrap_or(&config.logging.level),
        cli.log_json || config.logging.json,
    )?;
    if let Some(err) = config_error {
        tracing::warn!(error = %err, "using default config");
    }

    let format = resolve_format(&cli, &config);
    let mut settings = config.collector_settings();
    if let Some(timeout_ms) = cli.timeout_ms {
        settings.timeout = Duration::from_millis(timeout_ms);
    }
    let interval = Duration::from_millis(cli.interval_ms.unwrap_or(config.cpu.sample_interval_ms));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    let collector = Collector::host(settings, Arc::new(StderrSink));
    let snapshot = runtime.block_on(async {
        if !interval.is_zero() {
            collector.prime_cpu().await;
            tokio::time::sleep(interval).await;
        }
        collector.assemble().await
    });
    // A collector stuck past its timeout must not hold the process open.
    runtime.shutdown_timeout(SHUTDOWN_GRACE);

    let rendered = render::render(&snapshot, format, &mut stdout().lock(), &StderrSink);
    Ok(if rendered {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn load_config_for_cli(cli: &Cli) -> Result<Config, ConfigError> {
    match &cli.config {
        Some(path) => load_config_from_path(path),
        None => load_config(),
    }
}

fn resolve_format(cli: &Cli, config: &Config) -> OutputFormat {
    if cli.json {
        return OutputFormat::Json;
    }
    if let Some(format) = cli.format {
        return format;
    }
    parse_format(&config.general.format).unwrap_or_else(|| {
        tracing::warn!(format = %config.general.format, "unknown output format in config");
        OutputFormat::default()
    })
}
