/// Tracing setup for the application binary

use tracing_subscriber::EnvFilter;

/// Default filter when neither `RUST_LOG` nor the config provides one
pub const DEFAULT_LOG_FILTER: &str = "smart_scan=info";

/// Install the global fmt subscriber.
///
/// `RUST_LOG` wins over `filter`. Calling this twice is harmless: the second
/// subscriber is rejected and a debug event is emitted instead.
pub fn init_logging(filter: &str) {
    let filter = if filter.trim().is_empty() {
        DEFAULT_LOG_FILTER
    } else {
        filter
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init()
        .is_err()
    {
        tracing::debug!("tracing subscriber already installed");
    }
}
