use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::info;

use super::exercises::find_or_create;
use super::{Database, Result, StoreError};
use crate::session::{NewSession, PlannedExercise, ProgramId, Session, SessionExerciseDetail, SessionId};
use crate::validation::{validate_exercises, validate_session, validate_session_fields};

fn session_from_row(row: &Row<'_>) -> rusqlite::Result<Session> {
    Ok(Session {
        id: row.get("id")?,
        program_id: row.get("program_id")?,
        name: row.get("name")?,
        session_type: row.get("type")?,
        scheduled_date: row.get("scheduled_date")?,
        scheduled_time: row.get("scheduled_time")?,
        recurrence: row.get("recurrence")?,
        duration: row.get("duration")?,
        created_at: row.get("created_at")?,
    })
}

fn detail_from_row(row: &Row<'_>) -> rusqlite::Result<SessionExerciseDetail> {
    Ok(SessionExerciseDetail {
        id: row.get("id")?,
        session_id: row.get("session_id")?,
        exercise_id: row.get("exercise_id")?,
        order_index: row.get("order_index")?,
        sets: row.get("sets")?,
        reps: row.get("reps")?,
        duration: row.get("duration")?,
        rest_time: row.get("rest_time")?,
        exercise_name: row.get("exercise_name")?,
        exercise_category: row.get("exercise_category")?,
    })
}

fn write_exercises(conn: &Connection, session_id: SessionId, exercises: &[PlannedExercise]) -> rusqlite::Result<()> {
    conn.execute("DELETE FROM session_exercises WHERE session_id = ?1", [session_id])?;
    for (order_index, item) in exercises.iter().enumerate() {
        let exercise_id = find_or_create(conn, &item.name)?;
        conn.execute(
            r#"
            INSERT INTO session_exercises
            (session_id, exercise_id, order_index, sets, reps, duration, rest_time)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                session_id,
                exercise_id,
                order_index as i64,
                item.sets,
                item.reps,
                item.duration,
                item.rest_time,
            ],
        )?;
    }
    Ok(())
}

impl Database {
    fn query_sessions<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<Session>> {
        let mut stmt = self.conn().prepare(sql)?;
        let rows = stmt.query_map(params, session_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// All sessions, newest first
    pub fn sessions(&self) -> Result<Vec<Session>> {
        self.query_sessions("SELECT * FROM sessions ORDER BY created_at DESC, id DESC", [])
    }

    pub fn sessions_by_program(&self, program_id: ProgramId) -> Result<Vec<Session>> {
        self.query_sessions(
            "SELECT * FROM sessions WHERE program_id = ?1 ORDER BY created_at DESC, id DESC",
            [program_id],
        )
    }

    /// Sessions that do not belong to any program
    pub fn unassigned_sessions(&self) -> Result<Vec<Session>> {
        self.query_sessions(
            "SELECT * FROM sessions WHERE program_id IS NULL ORDER BY created_at DESC, id DESC",
            [],
        )
    }

    pub fn session(&self, id: SessionId) -> Result<Option<Session>> {
        Ok(self
            .conn()
            .query_row("SELECT * FROM sessions WHERE id = ?1", [id], session_from_row)
            .optional()?)
    }

    /// The session's exercises in planned order, with catalog names
    pub fn session_exercises(&self, session_id: SessionId) -> Result<Vec<SessionExerciseDetail>> {
        let mut stmt = self.conn().prepare(
            r#"
            SELECT se.*, e.name AS exercise_name, e.category AS exercise_category
            FROM session_exercises se
            JOIN exercises e ON e.id = se.exercise_id
            WHERE se.session_id = ?1
            ORDER BY se.order_index ASC
            "#,
        )?;
        let rows = stmt.query_map([session_id], detail_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Creates the session and its ordered exercise list in one transaction.
    /// Exercises are matched to the catalog by name and added when missing.
    pub fn create_session(&self, session: &NewSession, exercises: &[PlannedExercise]) -> Result<SessionId> {
        validate_session(session, exercises)?;
        if let Some(pid) = session.program_id {
            if self.program(pid)?.is_none() {
                return Err(StoreError::NotFound { kind: "program", id: pid });
            }
        }

        let tx = self.conn().unchecked_transaction()?;
        tx.execute(
            r#"
            INSERT INTO sessions
            (program_id, name, type, scheduled_date, scheduled_time, recurrence, duration)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                session.program_id,
                session.name.trim(),
                session.session_type,
                session.scheduled_date,
                session.scheduled_time,
                session.recurrence,
                session.duration,
            ],
        )?;
        let id = tx.last_insert_rowid();
        write_exercises(&tx, id, exercises)?;
        tx.commit()?;

        info!(id, name = %session.name, exercises = exercises.len(), "session created");
        Ok(id)
    }

    pub fn update_session(&self, id: SessionId, session: &NewSession) -> Result<()> {
        validate_session_fields(session)?;
        let changed = self.conn().execute(
            r#"
            UPDATE sessions
            SET program_id = ?1, name = ?2, type = ?3, scheduled_date = ?4,
                scheduled_time = ?5, recurrence = ?6, duration = ?7
            WHERE id = ?8
            "#,
            params![
                session.program_id,
                session.name.trim(),
                session.session_type,
                session.scheduled_date,
                session.scheduled_time,
                session.recurrence,
                session.duration,
                id,
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound { kind: "session", id });
        }
        Ok(())
    }

    pub fn replace_session_exercises(&self, id: SessionId, exercises: &[PlannedExercise]) -> Result<()> {
        validate_exercises(exercises)?;
        if self.session(id)?.is_none() {
            return Err(StoreError::NotFound { kind: "session", id });
        }
        let tx = self.conn().unchecked_transaction()?;
        write_exercises(&tx, id, exercises)?;
        tx.commit()?;
        Ok(())
    }

    /// Deletes the session together with its exercise list and history
    pub fn delete_session(&self, id: SessionId) -> Result<bool> {
        let tx = self.conn().unchecked_transaction()?;
        tx.execute("DELETE FROM session_logs WHERE session_id = ?1", [id])?;
        let changed = tx.execute("DELETE FROM sessions WHERE id = ?1", [id])?;
        tx.commit()?;
        if changed > 0 {
            info!(id, "session deleted");
        }
        Ok(changed > 0)
    }
}
