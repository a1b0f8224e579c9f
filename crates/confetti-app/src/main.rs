#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use confetti_engine::logging::{init_logging, LoggingConfig};

    init_logging(LoggingConfig::default());
    confetti_app::host::run(confetti_app::host::HostConfig::default())
}

// The browser entry point is `host::start`, run by wasm-bindgen on load.
#[cfg(target_arch = "wasm32")]
fn main() {}
