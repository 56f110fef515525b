use crate::config::LoggingSettings;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global tracing subscriber
///
/// `RUST_LOG` overrides the configured level and `LOG_FORMAT` the configured
/// format (`json`, `pretty` or `compact`). Output goes to stderr so the
/// batch binary can keep stdout for its JSON result.
pub fn init_logging(settings: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.level));
    let format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| settings.format.clone());

    let registry = tracing_subscriber::registry().with(filter);
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true);

    match format.as_str() {
        "pretty" => registry.with(layer.pretty()).init(),
        "compact" => registry.with(layer.compact()).init(),
        _ => registry.with(layer.json()).init(),
    }
}
