use color_eyre::eyre::{Result, eyre};
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber, writing to stderr so stdout stays
/// reserved for the rendered snapshot.
///
/// `RUST_LOG` takes precedence over `level`.
pub fn init_tracing(level: &str, json: bool) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| eyre!("invalid log filter `{level}`: {e}"))?,
    };

    let builder = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| eyre!("failed to set tracing subscriber: {e}"))
}
