//! Tracing setup for the binary.
//!
//! The subscriber goes in before configuration is read, so warnings raised while loading
//! reach stderr. Its filter starts from `STRESS_LENS_LOG` and is swapped for the
//! configured level once the config is known.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry, fmt, reload};

pub const DEFAULT_LOG_FILTER: &str = "stress_lens=info";
pub const LOG_ENV: &str = "STRESS_LENS_LOG";

/// Handle to the live filter of the installed subscriber.
pub struct LogHandle {
    filter: reload::Handle<EnvFilter, Registry>,
}

impl LogHandle {
    /// Replace the active filter. Invalid directives leave the current one in place.
    pub fn apply(&self, directives: &str) -> anyhow::Result<()> {
        let filter = EnvFilter::try_new(directives)?;
        self.filter.reload(filter)?;
        Ok(())
    }

    /// Active filter directives, lowercased.
    pub fn current(&self) -> Option<String> {
        self.filter.with_current(|f| f.to_string().to_lowercase()).ok()
    }
}

/// Filter used until configuration is loaded. `lookup` is `std::env::var` outside tests.
pub fn provisional_filter<F>(lookup: F) -> EnvFilter
where
    F: Fn(&str) -> Option<String>,
{
    lookup(LOG_ENV)
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Install the global stderr subscriber with the provisional filter.
pub fn init() -> anyhow::Result<LogHandle> {
    let (filter, handle) = reload::Layer::new(provisional_filter(|key| std::env::var(key).ok()));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()?;
    Ok(LogHandle { filter: handle })
}
