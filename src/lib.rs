pub mod analyzer;
pub mod commands;
pub mod config;
pub mod error;
pub mod history;
pub mod prefs;
pub mod products;
pub mod progress;

pub use analyzer::{extract_json_payload, normalize, AnalysisResult};
pub use config::AppConfig;
pub use error::{AnalysisError, ClearSkinError};
pub use history::{AnalysisRepository, SqliteHistory, StoredAnalysis};
pub use progress::{compare, ComparisonResult};

/// Install the global tracing subscriber. `RUST_LOG` wins; defaults to `info`.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
