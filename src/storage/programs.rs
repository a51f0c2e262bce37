use rusqlite::{params, OptionalExtension, Row};
use tracing::info;

use super::{Database, Result, StoreError};
use crate::session::{Program, ProgramId};
use crate::validation::validate_program;

fn program_from_row(row: &Row<'_>) -> rusqlite::Result<Program> {
    Ok(Program {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn normalize(description: Option<&str>) -> Option<&str> {
    description.map(str::trim).filter(|d| !d.is_empty())
}

impl Database {
    /// All programs, newest first
    pub fn programs(&self) -> Result<Vec<Program>> {
        let mut stmt = self
            .conn()
            .prepare("SELECT * FROM programs ORDER BY created_at DESC, id DESC")?;
        let rows = stmt.query_map([], program_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn program(&self, id: ProgramId) -> Result<Option<Program>> {
        Ok(self
            .conn()
            .query_row("SELECT * FROM programs WHERE id = ?1", [id], program_from_row)
            .optional()?)
    }

    pub fn create_program(&self, name: &str, description: Option<&str>) -> Result<ProgramId> {
        validate_program(name, description)?;
        self.conn().execute(
            "INSERT INTO programs (name, description) VALUES (?1, ?2)",
            params![name.trim(), normalize(description)],
        )?;
        let id = self.conn().last_insert_rowid();
        info!(id, name, "program created");
        Ok(id)
    }

    pub fn update_program(&self, id: ProgramId, name: &str, description: Option<&str>) -> Result<()> {
        validate_program(name, description)?;
        let changed = self.conn().execute(
            "UPDATE programs SET name = ?1, description = ?2, updated_at = CURRENT_TIMESTAMP WHERE id = ?3",
            params![name.trim(), normalize(description), id],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound { kind: "program", id });
        }
        Ok(())
    }

    /// Deletes the program and, by cascade, its sessions and their history
    pub fn delete_program(&self, id: ProgramId) -> Result<bool> {
        let tx = self.conn().unchecked_transaction()?;
        tx.execute(
            "DELETE FROM session_logs WHERE session_id IN (SELECT id FROM sessions WHERE program_id = ?1)",
            [id],
        )?;
        let changed = tx.execute("DELETE FROM programs WHERE id = ?1", [id])?;
        tx.commit()?;
        if changed > 0 {
            info!(id, "program deleted");
        }
        Ok(changed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{NewSession, PlannedExercise, SessionType};
    use assert_matches::assert_matches;

    #[test]
    fn create_get_update_delete() {
        let db = Database::open_in_memory().unwrap();
        let id = db.create_program("  Strength block ", Some("  ")).unwrap();

        let p = db.program(id).unwrap().unwrap();
        assert_eq!(p.name, "Strength block");
        assert_eq!(p.description, None);

        db.update_program(id, "Strength block 2", Some("Heavy week")).unwrap();
        let p = db.program(id).unwrap().unwrap();
        assert_eq!(p.name, "Strength block 2");
        assert_eq!(p.description.as_deref(), Some("Heavy week"));

        assert!(db.delete_program(id).unwrap());
        assert!(db.program(id).unwrap().is_none());
        assert!(!db.delete_program(id).unwrap());
    }

    #[test]
    fn newest_first() {
        let db = Database::open_in_memory().unwrap();
        db.create_program("First", None).unwrap();
        db.create_program("Second", None).unwrap();
        let names: Vec<String> = db.programs().unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Second", "First"]);
    }

    #[test]
    fn rejects_invalid_names() {
        let db = Database::open_in_memory().unwrap();
        assert_matches!(db.create_program("ab", None), Err(StoreError::Invalid(_)));
        assert_matches!(
            db.update_program(42, "Valid name", None),
            Err(StoreError::NotFound { kind: "program", id: 42 })
        );
    }

    #[test]
    fn delete_cascades_to_sessions() {
        let db = Database::open_in_memory().unwrap();
        let program = db.create_program("Cascade", None).unwrap();
        let mut new = NewSession::new("Owned session", SessionType::Emom);
        new.program_id = Some(program);
        let session = db
            .create_session(&new, &[PlannedExercise::named("Burpees")])
            .unwrap();

        db.delete_program(program).unwrap();
        assert!(db.session(session).unwrap().is_none());
    }
}
