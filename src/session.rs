use std::str::FromStr;

use clap::ValueEnum;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use crate::validation::ValidationError;

pub type ProgramId = i64;
pub type SessionId = i64;
pub type ExerciseId = i64;

/// Workout timing format. Labelling only: the timer behaves the same for all three.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionType {
    #[strum(serialize = "AMRAP")]
    Amrap,
    #[strum(serialize = "HIIT")]
    Hiit,
    #[strum(serialize = "EMOM")]
    Emom,
}

impl SessionType {
    pub const ALL: [SessionType; 3] = [SessionType::Amrap, SessionType::Hiit, SessionType::Emom];

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::Amrap => "AMRAP",
            SessionType::Hiit => "HIIT",
            SessionType::Emom => "EMOM",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SessionType::Amrap => {
                "As Many Rounds As Possible - complete as many rounds as you can in the time cap"
            }
            SessionType::Hiit => {
                "High Intensity Interval Training - alternate intense efforts and recovery"
            }
            SessionType::Emom => {
                "Every Minute On the Minute - start the prescribed reps at the top of each minute"
            }
        }
    }
}

impl FromStr for SessionType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SessionType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::UnknownValue {
                kind: "session type",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Recurrence {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
}

impl Recurrence {
    const ALL: [Recurrence; 4] = [
        Recurrence::None,
        Recurrence::Daily,
        Recurrence::Weekly,
        Recurrence::Monthly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Recurrence::None => "none",
            Recurrence::Daily => "daily",
            Recurrence::Weekly => "weekly",
            Recurrence::Monthly => "monthly",
        }
    }

    pub fn label(&self) -> Option<&'static str> {
        match self {
            Recurrence::None => None,
            Recurrence::Daily => Some("Every day"),
            Recurrence::Weekly => Some("Every week"),
            Recurrence::Monthly => Some("Every month"),
        }
    }
}

impl FromStr for Recurrence {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Recurrence::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::UnknownValue {
                kind: "recurrence",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ExerciseCategory {
    Cardio,
    Strength,
    Flexibility,
    #[default]
    Other,
}

impl ExerciseCategory {
    const ALL: [ExerciseCategory; 4] = [
        ExerciseCategory::Cardio,
        ExerciseCategory::Strength,
        ExerciseCategory::Flexibility,
        ExerciseCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseCategory::Cardio => "cardio",
            ExerciseCategory::Strength => "strength",
            ExerciseCategory::Flexibility => "flexibility",
            ExerciseCategory::Other => "other",
        }
    }
}

impl FromStr for ExerciseCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExerciseCategory::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::UnknownValue {
                kind: "exercise category",
                value: s.to_string(),
            })
    }
}

// The three enums are stored as their canonical text in SQLite.
macro_rules! text_column {
    ($ty:ty) => {
        impl ToSql for $ty {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $ty {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                let text = value.as_str()?;
                text.parse()
                    .map_err(|e: ValidationError| FromSqlError::Other(Box::new(e)))
            }
        }
    };
}

text_column!(SessionType);
text_column!(Recurrence);
text_column!(ExerciseCategory);

/// A named collection of sessions
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub id: ProgramId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A planned workout definition
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: SessionId,
    pub program_id: Option<ProgramId>,
    pub name: String,
    pub session_type: SessionType,
    pub scheduled_date: Option<String>,
    pub scheduled_time: Option<String>,
    pub recurrence: Recurrence,
    /// Planned duration in minutes
    pub duration: Option<u32>,
    pub created_at: String,
}

impl Session {
    /// Human readable schedule, e.g. `Monday, October 20, 2026 at 07:30`
    pub fn schedule_label(&self) -> Option<String> {
        let date = self.scheduled_date.as_deref()?;
        let mut label = match chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d") {
            Ok(d) => d.format("%A, %B %-d, %Y").to_string(),
            Err(_) => date.to_string(),
        };
        if let Some(time) = &self.scheduled_time {
            label.push_str(" at ");
            label.push_str(time);
        }
        Some(label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Exercise {
    pub id: ExerciseId,
    pub name: String,
    pub description: Option<String>,
    pub category: ExerciseCategory,
    pub is_custom: bool,
    pub created_at: String,
}

/// An exercise attached to a session, joined with its catalog name
#[derive(Debug, Clone, PartialEq)]
pub struct SessionExerciseDetail {
    pub id: i64,
    pub session_id: SessionId,
    pub exercise_id: ExerciseId,
    pub order_index: u32,
    pub sets: Option<u32>,
    pub reps: Option<u32>,
    pub duration: Option<u32>,
    pub rest_time: Option<u32>,
    pub exercise_name: String,
    pub exercise_category: ExerciseCategory,
}

/// Input for a session's exercise list; `NAME[:REPS[:SETS]]` on the command line
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlannedExercise {
    pub name: String,
    pub reps: Option<u32>,
    pub sets: Option<u32>,
    pub duration: Option<u32>,
    pub rest_time: Option<u32>,
}

impl PlannedExercise {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_reps(mut self, reps: u32) -> Self {
        self.reps = Some(reps);
        self
    }
}

impl FromStr for PlannedExercise {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':').map(str::trim);
        let name = parts.next().unwrap_or_default().to_string();
        let parse_num = |field: &'static str, raw: Option<&str>| -> Result<Option<u32>, ValidationError> {
            match raw {
                None | Some("") => Ok(None),
                Some(v) => v.parse().map(Some).map_err(|_| ValidationError::InvalidNumber {
                    field,
                    value: v.to_string(),
                }),
            }
        };
        let reps = parse_num("reps", parts.next())?;
        let sets = parse_num("sets", parts.next())?;
        if parts.next().is_some() {
            return Err(ValidationError::UnknownValue {
                kind: "exercise format",
                value: s.to_string(),
            });
        }
        Ok(Self {
            name,
            reps,
            sets,
            duration: None,
            rest_time: None,
        })
    }
}

/// Fields for creating or fully replacing a session definition
#[derive(Debug, Clone, PartialEq)]
pub struct NewSession {
    pub program_id: Option<ProgramId>,
    pub name: String,
    pub session_type: SessionType,
    pub scheduled_date: Option<String>,
    pub scheduled_time: Option<String>,
    pub recurrence: Recurrence,
    pub duration: Option<u32>,
}

impl NewSession {
    pub fn new(name: &str, session_type: SessionType) -> Self {
        Self {
            program_id: None,
            name: name.to_string(),
            session_type,
            scheduled_date: None,
            scheduled_time: None,
            recurrence: Recurrence::None,
            duration: None,
        }
    }
}
