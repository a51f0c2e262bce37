use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::info;

use super::{Database, Result, StoreError};
use crate::session::{Exercise, ExerciseCategory, ExerciseId};
use crate::validation::validate_exercise_name;

fn exercise_from_row(row: &Row<'_>) -> rusqlite::Result<Exercise> {
    Ok(Exercise {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        category: row.get("category")?,
        is_custom: row.get("is_custom")?,
        created_at: row.get("created_at")?,
    })
}

/// Reuses an exercise with the same name (case-insensitive) or adds a custom one
pub(crate) fn find_or_create(conn: &Connection, name: &str) -> rusqlite::Result<ExerciseId> {
    let name = name.trim();
    let existing: Option<ExerciseId> = conn
        .query_row(
            "SELECT id FROM exercises WHERE name = ?1 COLLATE NOCASE",
            [name],
            |row| row.get(0),
        )
        .optional()?;
    if let Some(id) = existing {
        return Ok(id);
    }
    conn.execute(
        "INSERT INTO exercises (name, category, is_custom) VALUES (?1, ?2, 1)",
        params![name, ExerciseCategory::Other],
    )?;
    Ok(conn.last_insert_rowid())
}

impl Database {
    pub fn exercises(&self) -> Result<Vec<Exercise>> {
        let mut stmt = self
            .conn()
            .prepare("SELECT * FROM exercises ORDER BY name COLLATE NOCASE ASC")?;
        let rows = stmt.query_map([], exercise_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn exercise(&self, id: ExerciseId) -> Result<Option<Exercise>> {
        Ok(self
            .conn()
            .query_row("SELECT * FROM exercises WHERE id = ?1", [id], exercise_from_row)
            .optional()?)
    }

    pub fn exercise_by_name(&self, name: &str) -> Result<Option<Exercise>> {
        Ok(self
            .conn()
            .query_row(
                "SELECT * FROM exercises WHERE name = ?1 COLLATE NOCASE",
                [name.trim()],
                exercise_from_row,
            )
            .optional()?)
    }

    pub fn create_exercise(
        &self,
        name: &str,
        category: ExerciseCategory,
        description: Option<&str>,
    ) -> Result<ExerciseId> {
        validate_exercise_name(name)?;
        self.conn().execute(
            "INSERT INTO exercises (name, category, description, is_custom) VALUES (?1, ?2, ?3, 1)",
            params![name.trim(), category, description.filter(|d| !d.trim().is_empty())],
        )?;
        let id = self.conn().last_insert_rowid();
        info!(id, name, %category, "exercise created");
        Ok(id)
    }

    /// Removes a custom exercise. Predefined ones are never deleted; returns
    /// whether a row was removed.
    pub fn delete_exercise(&self, id: ExerciseId) -> Result<bool> {
        let in_use: i64 = self.conn().query_row(
            r#"
            SELECT (SELECT COUNT(*) FROM session_exercises WHERE exercise_id = ?1)
                 + (SELECT COUNT(*) FROM exercise_logs WHERE exercise_id = ?1)
            "#,
            [id],
            |row| row.get(0),
        )?;
        if in_use > 0 {
            return Err(StoreError::InUse { kind: "exercise", id });
        }
        let changed = self
            .conn()
            .execute("DELETE FROM exercises WHERE id = ?1 AND is_custom = 1", [id])?;
        Ok(changed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{NewSession, PlannedExercise, SessionType};
    use assert_matches::assert_matches;

    #[test]
    fn create_and_list_sorted() {
        let db = Database::open_in_memory().unwrap();
        db.create_exercise("squats", ExerciseCategory::Strength, None).unwrap();
        db.create_exercise("Burpees", ExerciseCategory::Cardio, Some("Full body")).unwrap();

        let all = db.exercises().unwrap();
        let names: Vec<&str> = all.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Burpees", "squats"]);
        assert!(all.iter().all(|e| e.is_custom));
        assert_eq!(all[0].category, ExerciseCategory::Cardio);
        assert_eq!(all[0].description.as_deref(), Some("Full body"));
    }

    #[test]
    fn duplicate_names_are_rejected_by_schema() {
        let db = Database::open_in_memory().unwrap();
        db.create_exercise("Row", ExerciseCategory::Cardio, None).unwrap();
        assert_matches!(
            db.create_exercise("Row", ExerciseCategory::Cardio, None),
            Err(StoreError::Sqlite(_))
        );
    }

    #[test]
    fn find_or_create_reuses_case_insensitively() {
        let db = Database::open_in_memory().unwrap();
        let a = find_or_create(db.conn(), "Push-ups").unwrap();
        let b = find_or_create(db.conn(), " push-ups ").unwrap();
        assert_eq!(a, b);
        assert_eq!(db.exercises().unwrap().len(), 1);
    }

    #[test]
    fn predefined_exercises_are_protected() {
        let db = Database::open_in_memory().unwrap();
        db.conn()
            .execute(
                "INSERT INTO exercises (name, category, is_custom) VALUES ('Deadlift', 'strength', 0)",
                [],
            )
            .unwrap();
        let id = db.exercise_by_name("deadlift").unwrap().unwrap().id;

        assert!(!db.delete_exercise(id).unwrap());
        assert!(db.exercise(id).unwrap().is_some());
    }

    #[test]
    fn exercises_used_by_sessions_cannot_be_deleted() {
        let db = Database::open_in_memory().unwrap();
        db.create_session(
            &NewSession::new("Upper body", SessionType::Amrap),
            &[PlannedExercise::named("Dips")],
        )
        .unwrap();
        let id = db.exercise_by_name("Dips").unwrap().unwrap().id;
        assert_matches!(db.delete_exercise(id), Err(StoreError::InUse { .. }));

        let spare = db.create_exercise("Lunges", ExerciseCategory::Strength, None).unwrap();
        assert!(db.delete_exercise(spare).unwrap());
    }
}
