use std::io::Write;

use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use serde::Serialize;
use time_humanize::HumanTime;
use tracing::info;

use super::{Database, Result};
use crate::elapsed::format_clock;
use crate::session::SessionId;
use crate::summary::WorkoutSummary;

/// One completed workout
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub session_id: SessionId,
    pub session_name: String,
    /// UTC, `YYYY-MM-DD HH:MM:SS`
    pub completed_at: String,
    pub total_time: u64,
    pub total_reps: u64,
}

impl HistoryEntry {
    /// "3 hours ago" style label relative to now
    pub fn completed_ago(&self) -> String {
        match NaiveDateTime::parse_from_str(&self.completed_at, "%Y-%m-%d %H:%M:%S") {
            Ok(at) => {
                let secs = (Utc::now().naive_utc() - at).num_seconds().max(0);
                HumanTime::from_seconds(-secs).to_string()
            }
            Err(_) => self.completed_at.clone(),
        }
    }

    pub fn duration_label(&self) -> String {
        format_clock(self.total_time)
    }
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<HistoryEntry> {
    Ok(HistoryEntry {
        id: row.get("id")?,
        session_id: row.get("session_id")?,
        session_name: row.get("session_name")?,
        completed_at: row.get("completed_at")?,
        total_time: row.get("total_time")?,
        total_reps: row.get("total_reps")?,
    })
}

/// Sink for finished workouts, implemented by `Database`
pub trait HistoryRecorder {
    fn record_workout(&self, summary: &WorkoutSummary) -> Result<i64>;
}

impl HistoryRecorder for Database {
    fn record_workout(&self, summary: &WorkoutSummary) -> Result<i64> {
        let tx = self.conn().unchecked_transaction()?;
        tx.execute(
            "INSERT INTO session_logs (session_id, total_time, total_reps) VALUES (?1, ?2, ?3)",
            params![summary.session_id, summary.total_seconds, summary.total_reps],
        )?;
        let log_id = tx.last_insert_rowid();
        for result in &summary.per_exercise {
            tx.execute(
                "INSERT INTO exercise_logs (session_log_id, exercise_id, reps_completed) VALUES (?1, ?2, ?3)",
                params![log_id, result.exercise_id, result.reps],
            )?;
        }
        tx.commit()?;
        info!(
            log_id,
            session_id = summary.session_id,
            total_seconds = summary.total_seconds,
            total_reps = summary.total_reps,
            "workout recorded"
        );
        Ok(log_id)
    }
}

#[derive(Serialize)]
struct CsvRow<'a> {
    completed_at: &'a str,
    session: &'a str,
    duration: String,
    total_seconds: u64,
    total_reps: u64,
}

impl Database {
    /// Most recent workouts first
    pub fn recent_workouts(&self, limit: usize) -> Result<Vec<HistoryEntry>> {
        let mut stmt = self.conn().prepare(
            r#"
            SELECT l.id, l.session_id, COALESCE(s.name, '(deleted session)') AS session_name,
                   l.completed_at, l.total_time, l.total_reps
            FROM session_logs l
            LEFT JOIN sessions s ON s.id = l.session_id
            ORDER BY l.completed_at DESC, l.id DESC
            LIMIT ?1
            "#,
        )?;
        let rows = stmt.query_map([limit as i64], entry_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn workout(&self, log_id: i64) -> Result<Option<HistoryEntry>> {
        let mut stmt = self.conn().prepare(
            r#"
            SELECT l.id, l.session_id, COALESCE(s.name, '(deleted session)') AS session_name,
                   l.completed_at, l.total_time, l.total_reps
            FROM session_logs l
            LEFT JOIN sessions s ON s.id = l.session_id
            WHERE l.id = ?1
            "#,
        )?;
        Ok(stmt.query_row([log_id], entry_from_row).optional()?)
    }

    /// Reps logged per exercise for one workout, in insertion order
    pub fn workout_exercise_reps(&self, log_id: i64) -> Result<Vec<(String, u32)>> {
        let mut stmt = self.conn().prepare(
            r#"
            SELECT e.name, x.reps_completed
            FROM exercise_logs x
            JOIN exercises e ON e.id = x.exercise_id
            WHERE x.session_log_id = ?1
            ORDER BY x.id ASC
            "#,
        )?;
        let rows = stmt.query_map([log_id], |row| Ok((row.get(0)?, row.get(1)?)))?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Writes the whole history as CSV, returning the number of rows
    pub fn export_history_csv<W: Write>(&self, out: W) -> Result<usize> {
        let entries = self.recent_workouts(usize::MAX >> 1)?;
        let mut writer = csv::Writer::from_writer(out);
        for entry in entries.iter().rev() {
            writer.serialize(CsvRow {
                completed_at: &entry.completed_at,
                session: &entry.session_name,
                duration: entry.duration_label(),
                total_seconds: entry.total_time,
                total_reps: entry.total_reps,
            })?;
        }
        writer.flush().map_err(csv::Error::from)?;
        Ok(entries.len())
    }
}
