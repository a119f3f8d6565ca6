//! Logging initialization

/// Initialize the logging system
///
/// Uses env_logger with default filter level of `info`.
/// Override with RUST_LOG environment variable, e.g. `RUST_LOG=treevox=debug`
/// to see per-stage tile output.
///
/// # Example
/// ```
/// treevox::core::logging::init();
/// log::info!("Placing trees");
/// ```
pub fn init() {
    // try_init so repeated calls (doc tests, multiple binaries in one process) don't panic
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).try_init();
}
