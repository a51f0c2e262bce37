use thiserror::Error;

use crate::session::{NewSession, PlannedExercise};

pub const NAME_MIN_CHARS: usize = 3;
pub const NAME_MAX_CHARS: usize = 50;
pub const DESCRIPTION_MAX_CHARS: usize = 200;
pub const EXERCISE_NAME_MIN_CHARS: usize = 2;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },

    #[error("{field} cannot exceed {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("{field} must be greater than 0")]
    NotPositive { field: &'static str },

    #[error("add at least one exercise")]
    NoExercises,

    #[error("unknown {kind}: {value}")]
    UnknownValue { kind: &'static str, value: String },

    #[error("{field} is not a number: {value}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("invalid {field}: {value}")]
    InvalidSchedule { field: &'static str, value: String },
}

fn check_len(field: &'static str, value: &str, min: usize, max: usize) -> Result<(), ValidationError> {
    let len = value.trim().chars().count();
    if len < min {
        Err(ValidationError::TooShort { field, min })
    } else if len > max {
        Err(ValidationError::TooLong { field, max })
    } else {
        Ok(())
    }
}

fn check_positive(field: &'static str, value: Option<u32>) -> Result<(), ValidationError> {
    match value {
        Some(0) => Err(ValidationError::NotPositive { field }),
        _ => Ok(()),
    }
}

pub fn validate_program(name: &str, description: Option<&str>) -> Result<(), ValidationError> {
    check_len("program name", name, NAME_MIN_CHARS, NAME_MAX_CHARS)?;
    if let Some(desc) = description {
        check_len("description", desc, 0, DESCRIPTION_MAX_CHARS)?;
    }
    Ok(())
}

pub fn validate_exercise_name(name: &str) -> Result<(), ValidationError> {
    check_len("exercise name", name, EXERCISE_NAME_MIN_CHARS, usize::MAX)
}

pub fn validate_session(session: &NewSession, exercises: &[PlannedExercise]) -> Result<(), ValidationError> {
    validate_session_fields(session)?;
    validate_exercises(exercises)
}

/// Session-level rules only, for updates that keep the exercise list
pub fn validate_session_fields(session: &NewSession) -> Result<(), ValidationError> {
    check_len("session name", &session.name, NAME_MIN_CHARS, NAME_MAX_CHARS)?;
    check_positive("duration", session.duration)?;
    if let Some(date) = &session.scheduled_date {
        chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
            ValidationError::InvalidSchedule {
                field: "date",
                value: date.clone(),
            }
        })?;
    }
    if let Some(time) = &session.scheduled_time {
        chrono::NaiveTime::parse_from_str(time, "%H:%M").map_err(|_| {
            ValidationError::InvalidSchedule {
                field: "time",
                value: time.clone(),
            }
        })?;
    }
    Ok(())
}

pub fn validate_exercises(exercises: &[PlannedExercise]) -> Result<(), ValidationError> {
    if exercises.is_empty() {
        return Err(ValidationError::NoExercises);
    }
    for exercise in exercises {
        validate_exercise_name(&exercise.name)?;
        check_positive("sets", exercise.sets)?;
        check_positive("exercise duration", exercise.duration)?;
    }
    Ok(())
}
