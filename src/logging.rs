//! Tracing setup.
//!
//! The subscriber is installed before the config file is read so the
//! loader's own warnings are not lost. The filter sits behind a reload
//! layer; once the config is known, its `log_level` replaces the default.
//! `RUST_LOG` always wins over both.

use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

/// Filter used when neither RUST_LOG nor `log_level` is set
pub const DEFAULT_FILTER: &str = "skiff=info";

/// Swaps the active filter after startup
pub type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// Build the subscriber writing to `make_writer`, with the filter taken from
/// RUST_LOG or [`DEFAULT_FILTER`].
pub fn subscriber<W>(make_writer: W) -> (impl Subscriber + Send + Sync + 'static, FilterHandle)
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let (filter, handle) = reload::Layer::new(filter);
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(make_writer));
    (subscriber, handle)
}

/// Apply the configured `log_level` unless RUST_LOG is set
pub fn apply_log_level(handle: &FilterHandle, log_level: Option<&str>) {
    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        return;
    }
    if let Some(level) = log_level {
        if let Err(e) = set_filter(handle, level) {
            tracing::warn!(log_level = %level, error = %e, "Ignoring invalid log_level");
        }
    }
}

fn set_filter(handle: &FilterHandle, directives: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_new(directives)?;
    handle.reload(filter)?;
    tracing::debug!(filter = %directives, "Log filter changed");
    Ok(())
}
