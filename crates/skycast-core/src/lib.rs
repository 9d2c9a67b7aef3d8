pub mod app;
pub mod config;
pub mod error;
pub mod view_state;

pub use app::App;
pub use config::{
    Config, LocationConfig, LocationMode, LookupConfig, UiConfig, ValidationResult, WeatherConfig,
};
pub use error::{
    AppError, ConfigError, FetchErrorKind, LookupError, NetworkError, ReqwestErrorExt,
    WeatherError,
};
pub use view_state::{CycleCounter, ViewPhase};

/// Initialize tracing/logging on stderr.
///
/// `RUST_LOG` takes precedence; otherwise `verbosity` picks the level
/// (0 = info, 1 = debug, 2+ = trace).
pub fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .try_init();

    tracing::debug!("SkyCast tracing initialized");
}
