use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info", "warn",
/// "confetti_engine=debug"). In the browser only a bare level is honoured.
#[derive(Debug, Clone, Default)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    #[cfg(not(target_arch = "wasm32"))]
    pub write_style: WriteStyle,
}

#[cfg(not(target_arch = "wasm32"))]
pub use env_logger::WriteStyle;

static INIT: Once = Once::new();

/// Initializes the global logger once.
///
/// This function is idempotent; subsequent calls are ignored.
/// Intended usage is early in `main` (or the wasm start function).
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        install(config);
        log::debug!("logging initialized");
    });
}

#[cfg(not(target_arch = "wasm32"))]
fn install(config: LoggingConfig) {
    let mut builder = env_logger::Builder::new();

    if let Some(filter) = config.env_filter {
        builder.parse_filters(&filter);
    } else if let Ok(filter) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filter);
    } else {
        builder.filter_level(log::LevelFilter::Info);
    }

    builder.write_style(config.write_style);
    builder.init();
}

#[cfg(target_arch = "wasm32")]
fn install(config: LoggingConfig) {
    let level = config
        .env_filter
        .as_deref()
        .and_then(level_from_filter)
        .unwrap_or(log::Level::Info);

    // Another logger may already be installed by the embedding page.
    let _ = console_log::init_with_level(level);
}

/// Parses a filter consisting of a single level name.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
fn level_from_filter(filter: &str) -> Option<log::Level> {
    filter.trim().parse().ok()
}
