//! Command layer used by the binary (and any other front end).
//!
//! Each command takes the shared `AppContext` and returns
//! `Result<_, ClearSkinError>`; front ends that need plain strings can rely
//! on `From<ClearSkinError> for String`.

pub mod analyzer;
pub mod history;
pub mod prefs;
pub mod products;

use tracing::info;

use crate::config::AppConfig;
use crate::error::{ClearSkinError, Result};
use crate::history::SqliteHistory;
use crate::prefs::PreferenceStore;
use crate::products::{default_catalog, load_catalog, Catalog};

/// Everything the commands need, opened once per process.
pub struct AppContext {
    pub config: AppConfig,
    pub history: SqliteHistory,
    pub prefs: PreferenceStore,
    pub catalog: Catalog,
}

impl AppContext {
    pub fn new(
        config: AppConfig,
        history: SqliteHistory,
        prefs: PreferenceStore,
        catalog: Catalog,
    ) -> Self {
        Self {
            config,
            history,
            prefs,
            catalog,
        }
    }

    /// Open the stores under the configured data directory.
    pub fn open(config: AppConfig) -> Result<Self> {
        let data_dir = config.data_dir();
        let history = SqliteHistory::open(&config.db_path())?;
        let prefs = PreferenceStore::new(config.prefs_path());

        let catalog = match config.products_path {
            Some(ref path) => load_catalog(path),
            None => default_catalog(),
        }
        .map_err(|e| ClearSkinError::Config(format!("{:#}", e)))?;

        info!(
            "Opened ClearSkin data in {:?} ({} products)",
            data_dir,
            catalog.products.len()
        );
        Ok(Self::new(config, history, prefs, catalog))
    }

    pub fn user_id(&self) -> &str {
        &self.config.user_id
    }
}
