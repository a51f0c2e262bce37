//! Read-only lookups the workout screen depends on.
//!
//! The screen never talks to SQLite directly; it goes through these traits so
//! it can be driven with in-memory fakes.

use crate::session::{ProgramId, Session, SessionExerciseDetail, SessionId};
use crate::storage::{Database, StoreError};

/// Shown wherever a session has no owning program
pub const NO_PROGRAM_LABEL: &str = "No program";

pub trait SessionLookup {
    fn session(&self, id: SessionId) -> Result<Option<Session>, StoreError>;
    /// Exercises in planned order, joined with their catalog names
    fn session_exercises(&self, id: SessionId) -> Result<Vec<SessionExerciseDetail>, StoreError>;
}

pub trait ProgramLookup {
    fn program_name(&self, id: ProgramId) -> Result<Option<String>, StoreError>;
}

/// Program label for a session, falling back to `NO_PROGRAM_LABEL`
pub fn program_label<P: ProgramLookup + ?Sized>(
    programs: &P,
    program_id: Option<ProgramId>,
) -> Result<String, StoreError> {
    let name = match program_id {
        Some(id) => programs.program_name(id)?,
        None => None,
    };
    Ok(name.unwrap_or_else(|| NO_PROGRAM_LABEL.to_string()))
}

impl SessionLookup for Database {
    fn session(&self, id: SessionId) -> Result<Option<Session>, StoreError> {
        Database::session(self, id)
    }

    fn session_exercises(&self, id: SessionId) -> Result<Vec<SessionExerciseDetail>, StoreError> {
        Database::session_exercises(self, id)
    }
}

impl ProgramLookup for Database {
    fn program_name(&self, id: ProgramId) -> Result<Option<String>, StoreError> {
        Ok(self.program(id)?.map(|p| p.name))
    }
}
