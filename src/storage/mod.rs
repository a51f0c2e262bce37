//! SQLite persistence for programs, sessions, the exercise catalog and
//! workout history.

pub mod exercises;
pub mod history;
pub mod programs;
pub mod sessions;

use std::io;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension};
use thiserror::Error;
use tracing::{debug, info};

use crate::validation::ValidationError;

pub use history::{HistoryEntry, HistoryRecorder};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("could not prepare {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid input: {0}")]
    Invalid(#[from] ValidationError),

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: i64 },

    #[error("{kind} {id} is still in use")]
    InUse { kind: &'static str, id: i64 },

    #[error("history export failed: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

const CURRENT_DB_VERSION: i64 = 1;

const SCHEMA_V1: &str = r#"
    CREATE TABLE IF NOT EXISTS programs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        description TEXT,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
        updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
    );

    CREATE TABLE IF NOT EXISTS sessions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        program_id INTEGER,
        name TEXT NOT NULL,
        type TEXT NOT NULL CHECK(type IN ('AMRAP', 'HIIT', 'EMOM')),
        scheduled_date DATE,
        scheduled_time TIME,
        recurrence TEXT DEFAULT 'none' CHECK(recurrence IN ('none', 'daily', 'weekly', 'monthly')),
        duration INTEGER,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
        FOREIGN KEY (program_id) REFERENCES programs(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS exercises (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        description TEXT,
        category TEXT DEFAULT 'other' CHECK(category IN ('cardio', 'strength', 'flexibility', 'other')),
        is_custom INTEGER DEFAULT 0,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP
    );

    CREATE TABLE IF NOT EXISTS session_exercises (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        session_id INTEGER NOT NULL,
        exercise_id INTEGER NOT NULL,
        order_index INTEGER NOT NULL,
        sets INTEGER,
        reps INTEGER,
        duration INTEGER,
        rest_time INTEGER,
        FOREIGN KEY (session_id) REFERENCES sessions(id) ON DELETE CASCADE,
        FOREIGN KEY (exercise_id) REFERENCES exercises(id)
    );

    CREATE TABLE IF NOT EXISTS session_logs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        session_id INTEGER NOT NULL,
        completed_at DATETIME DEFAULT CURRENT_TIMESTAMP,
        total_time INTEGER NOT NULL,
        total_reps INTEGER DEFAULT 0,
        global_comment TEXT,
        FOREIGN KEY (session_id) REFERENCES sessions(id)
    );

    CREATE TABLE IF NOT EXISTS exercise_logs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        session_log_id INTEGER NOT NULL,
        exercise_id INTEGER NOT NULL,
        reps_completed INTEGER DEFAULT 0,
        comment TEXT,
        audio_path TEXT,
        FOREIGN KEY (session_log_id) REFERENCES session_logs(id) ON DELETE CASCADE,
        FOREIGN KEY (exercise_id) REFERENCES exercises(id)
    );

    CREATE INDEX IF NOT EXISTS idx_sessions_program ON sessions(program_id);
    CREATE INDEX IF NOT EXISTS idx_session_exercises_session ON session_exercises(session_id);
"#;

/// Handle to the pushit database
#[derive(Debug)]
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        debug!(path = %path.display(), "opening database");
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn schema_version(&self) -> Result<i64> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS db_version (
                version INTEGER PRIMARY KEY,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );
            "#,
        )?;
        let version: Option<i64> = self
            .conn
            .query_row(
                "SELECT version FROM db_version ORDER BY version DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(version.unwrap_or(0))
    }

    fn migrate(&self) -> Result<()> {
        let current = self.schema_version()?;
        if current >= CURRENT_DB_VERSION {
            debug!(version = current, "database is up to date");
            return Ok(());
        }

        if current < 1 {
            info!("running database migration v0 -> v1");
            self.conn.execute_batch(SCHEMA_V1)?;
            self.conn
                .execute("INSERT INTO db_version (version) VALUES (?1)", [1])?;
        }

        info!(version = CURRENT_DB_VERSION, "database migrated");
        Ok(())
    }
}
