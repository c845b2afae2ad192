//! Tracing bootstrap for Folio binaries.

use anyhow::anyhow;
use tracing_subscriber::EnvFilter;

use folio_kernel::settings::{LogFormat, Settings};

/// Initialize the global tracing subscriber.
///
/// The filter comes from `RUST_LOG` when set and defaults to `info`; the
/// output format follows the configured telemetry settings.
pub fn init(settings: &Settings) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = match settings.telemetry.log_format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    result.map_err(|err| anyhow!("failed to initialize tracing subscriber: {err}"))
}
