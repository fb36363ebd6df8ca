//! Logging and tracing bootstrap for bookmart.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bookmart_kernel::settings::{LogFormat, TelemetrySettings};

/// Install the global tracing subscriber.
///
/// The filter comes from settings, falling back to `RUST_LOG`, then to
/// `info`. Call once at process startup, before anything logs.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let filter = match &settings.filter {
        Some(directives) => EnvFilter::try_new(directives)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let registry = tracing_subscriber::registry().with(filter);
    match settings.log_format {
        LogFormat::Pretty => registry.with(fmt::layer()).try_init()?,
        LogFormat::Json => registry.with(fmt::layer().json()).try_init()?,
    }

    tracing::debug!(target: "bookmart-telemetry", "telemetry initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_filter_directives_are_an_error() {
        let settings = TelemetrySettings {
            filter: Some("bookmart=notalevel".into()),
            log_format: LogFormat::Pretty,
        };
        assert!(init(&settings).is_err());
    }
}
