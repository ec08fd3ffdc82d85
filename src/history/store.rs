use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use tracing::{debug, info, warn};

use super::bounded::{BoundedHistory, HISTORY_CAP};
use super::types::StoredAnalysis;
use crate::analyzer::normalize;
use crate::error::{ClearSkinError, Result};

/// Storage contract for analyses and per-user history.
pub trait AnalysisRepository {
    /// Persist a new analysis. Ids are unique; saving twice is an error.
    fn save(&self, analysis: &StoredAnalysis) -> Result<()>;

    fn get(&self, id: &str) -> Result<Option<StoredAnalysis>>;

    /// Most recent analyses by creation time, newest first.
    fn recent(&self, limit: usize) -> Result<Vec<StoredAnalysis>>;

    /// Append a saved analysis to the user's capped history and return the
    /// ids evicted to stay within the cap, oldest first.
    ///
    /// The analysis must exist; appending an id already in the list leaves
    /// the list unchanged.
    fn append_history(&self, user_id: &str, analysis_id: &str) -> Result<Vec<String>>;

    /// The user's history, newest first.
    fn history(&self, user_id: &str) -> Result<Vec<StoredAnalysis>>;
}

/// SQLite store for analyses and history.
///
/// The connection is held behind a mutex, so at most one statement (and in
/// particular one history read-modify-write) runs at a time per store. All
/// operations are blocking; async callers with heavy load should use
/// `tokio::task::spawn_blocking`.
pub struct SqliteHistory {
    conn: Mutex<Connection>,
    history_cap: usize,
}

/// Raw row as read from `analyses`, before decoding.
struct AnalysisRow {
    id: String,
    created_at: String,
    photo_uri: String,
    result_json: String,
}

const SELECT_ANALYSIS: &str = "SELECT a.id, a.created_at, a.photo_uri, a.result_json FROM analyses a";

impl SqliteHistory {
    /// Create or open the analysis database at `db_path`.
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path).map_err(|e| {
            ClearSkinError::Storage(format!("Failed to open analysis db {:?}: {}", db_path, e))
        })?;
        let store = Self::with_connection(conn)?;
        info!("Opened analysis database at {:?}", db_path);
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS analyses (
                id TEXT PRIMARY KEY,
                created_at TEXT NOT NULL,
                photo_uri TEXT NOT NULL,
                result_json TEXT NOT NULL,
                user_id TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_analyses_created ON analyses(created_at DESC);
            CREATE TABLE IF NOT EXISTS analysis_history (
                user_id TEXT NOT NULL,
                position INTEGER NOT NULL,
                analysis_id TEXT NOT NULL,
                PRIMARY KEY (user_id, position)
            );
            CREATE TABLE IF NOT EXISTS last_analysis (
                user_id TEXT PRIMARY KEY,
                analysis_id TEXT NOT NULL
            );",
        )
        .map_err(|e| ClearSkinError::Storage(format!("Failed to create tables: {}", e)))?;
        ensure_owner_column(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            history_cap: HISTORY_CAP,
        })
    }

    /// Override the history cap (20 by default).
    pub fn with_history_cap(mut self, cap: usize) -> Self {
        self.history_cap = cap.max(1);
        self
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| ClearSkinError::Storage("Analysis store lock poisoned".to_string()))
    }

    /// Save a completed analysis, make it the user's latest, and append it
    /// to the user's history.
    pub fn record_completed(&self, user_id: &str, analysis: &StoredAnalysis) -> Result<()> {
        self.save(analysis)?;
        self.set_last_analysis(user_id, &analysis.id)?;
        for evicted in self.append_history(user_id, &analysis.id)? {
            info!("History full for {}, evicted {}", user_id, evicted);
        }
        Ok(())
    }

    pub fn set_last_analysis(&self, user_id: &str, analysis_id: &str) -> Result<()> {
        self.lock()?.execute(
            "INSERT OR REPLACE INTO last_analysis (user_id, analysis_id) VALUES (?1, ?2)",
            params![user_id, analysis_id],
        )?;
        Ok(())
    }

    pub fn last_analysis(&self, user_id: &str) -> Result<Option<StoredAnalysis>> {
        let row = self
            .lock()?
            .query_row(
                &format!(
                    "{} JOIN last_analysis l ON l.analysis_id = a.id WHERE l.user_id = ?1",
                    SELECT_ANALYSIS
                ),
                params![user_id],
                read_row,
            )
            .optional()?;
        row.map(decode_row).transpose()
    }

    /// Remove the user's history, latest pointer and every analysis they
    /// own, including ones already evicted from the history list.
    pub fn clear_user(&self, user_id: &str) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let removed = tx.execute(
            "DELETE FROM analyses WHERE user_id = ?1 OR id IN (
                SELECT analysis_id FROM analysis_history WHERE user_id = ?1
                UNION SELECT analysis_id FROM last_analysis WHERE user_id = ?1
            )",
            params![user_id],
        )?;
        tx.execute("DELETE FROM analysis_history WHERE user_id = ?1", params![user_id])?;
        tx.execute("DELETE FROM last_analysis WHERE user_id = ?1", params![user_id])?;
        tx.commit()?;
        info!("Cleared {} analyses for user {}", removed, user_id);
        Ok(())
    }
}

impl AnalysisRepository for SqliteHistory {
    fn save(&self, analysis: &StoredAnalysis) -> Result<()> {
        let result_json = serde_json::to_string(&analysis.result)
            .map_err(|e| ClearSkinError::Storage(format!("Failed to serialize analysis: {}", e)))?;

        self.lock()?
            .execute(
                "INSERT INTO analyses (id, created_at, photo_uri, result_json)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    analysis.id,
                    format_timestamp(&analysis.created_at),
                    analysis.photo_uri,
                    result_json
                ],
            )
            .map_err(|e| {
                ClearSkinError::Storage(format!("Failed to insert analysis {}: {}", analysis.id, e))
            })?;

        info!("Recorded analysis {}", analysis.id);
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<StoredAnalysis>> {
        let row = self
            .lock()?
            .query_row(
                &format!("{} WHERE a.id = ?1", SELECT_ANALYSIS),
                params![id],
                read_row,
            )
            .optional()?;
        row.map(decode_row).transpose()
    }

    fn recent(&self, limit: usize) -> Result<Vec<StoredAnalysis>> {
        let rows = {
            let conn = self.lock()?;
            let mut stmt = conn.prepare(&format!(
                "{} ORDER BY a.created_at DESC, a.id DESC LIMIT ?1",
                SELECT_ANALYSIS
            ))?;
            let rows = stmt.query_map(params![limit as i64], read_row)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };
        rows.into_iter().map(decode_row).collect()
    }

    fn append_history(&self, user_id: &str, analysis_id: &str) -> Result<Vec<String>> {
        let mut conn = self.lock()?;
        // IMMEDIATE takes the write lock up front, so another process cannot
        // interleave between our read and rewrite of the list.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let exists = tx
            .query_row(
                "SELECT 1 FROM analyses WHERE id = ?1",
                params![analysis_id],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if !exists {
            return Err(ClearSkinError::NotFound(format!(
                "Analysis {} is not stored",
                analysis_id
            )));
        }

        let current: Vec<String> = {
            let mut stmt = tx.prepare(
                "SELECT analysis_id FROM analysis_history WHERE user_id = ?1 ORDER BY position ASC",
            )?;
            let ids = stmt.query_map(params![user_id], |row| row.get(0))?;
            ids.collect::<rusqlite::Result<Vec<_>>>()?
        };

        if current.iter().any(|id| id == analysis_id) {
            debug!("Analysis {} already in history for {}", analysis_id, user_id);
            return Ok(Vec::new());
        }

        // Replay through the bounded list so a lowered cap reports every
        // id that no longer fits.
        let mut list = BoundedHistory::new(self.history_cap);
        let evicted = list.push_all(current.into_iter().chain([analysis_id.to_string()]));

        tx.execute(
            "UPDATE analyses SET user_id = ?1 WHERE id = ?2 AND user_id IS NULL",
            params![user_id, analysis_id],
        )?;
        tx.execute("DELETE FROM analysis_history WHERE user_id = ?1", params![user_id])?;
        for (position, id) in list.iter().enumerate() {
            tx.execute(
                "INSERT INTO analysis_history (user_id, position, analysis_id) VALUES (?1, ?2, ?3)",
                params![user_id, position as i64, id],
            )?;
        }
        tx.commit()?;

        Ok(evicted)
    }

    fn history(&self, user_id: &str) -> Result<Vec<StoredAnalysis>> {
        let rows = {
            let conn = self.lock()?;
            let mut stmt = conn.prepare(&format!(
                "{} JOIN analysis_history h ON h.analysis_id = a.id
                 WHERE h.user_id = ?1 ORDER BY h.position DESC",
                SELECT_ANALYSIS
            ))?;
            let rows = stmt.query_map(params![user_id], read_row)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };
        rows.into_iter().map(decode_row).collect()
    }
}

/// Databases created before analyses carried an owner get the column added.
fn ensure_owner_column(conn: &Connection) -> Result<()> {
    let has_owner: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM pragma_table_info('analyses') WHERE name = 'user_id'",
        [],
        |row| row.get(0),
    )?;
    if !has_owner {
        conn.execute_batch("ALTER TABLE analyses ADD COLUMN user_id TEXT")
            .map_err(|e| ClearSkinError::Storage(format!("Failed to add owner column: {}", e)))?;
        info!("Added owner column to analyses table");
    }
    conn.execute_batch("CREATE INDEX IF NOT EXISTS idx_analyses_user ON analyses(user_id)")?;
    Ok(())
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AnalysisRow> {
    Ok(AnalysisRow {
        id: row.get(0)?,
        created_at: row.get(1)?,
        photo_uri: row.get(2)?,
        result_json: row.get(3)?,
    })
}

/// Decode a row. The stored result is normalized again so that rows
/// written by older versions still satisfy every bound.
fn decode_row(row: AnalysisRow) -> Result<StoredAnalysis> {
    let created_at = DateTime::parse_from_rfc3339(&row.created_at)
        .map_err(|e| {
            ClearSkinError::Storage(format!("Bad timestamp for analysis {}: {}", row.id, e))
        })?
        .with_timezone(&Utc);

    let raw: serde_json::Value = serde_json::from_str(&row.result_json).unwrap_or_else(|e| {
        warn!("Stored result for {} is not valid JSON ({}), using defaults", row.id, e);
        serde_json::Value::Null
    });

    Ok(StoredAnalysis {
        id: row.id,
        created_at,
        photo_uri: row.photo_uri,
        result: normalize(&raw),
    })
}

/// Fixed-width RFC 3339 so that text ordering matches time ordering.
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}
