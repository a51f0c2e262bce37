use crate::session::{ExerciseId, SessionExerciseDetail, SessionId, SessionType};

/// An exercise being performed in the live workout
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutExercise {
    pub exercise_id: ExerciseId,
    pub name: String,
    pub reps: u32,
    pub planned_reps: Option<u32>,
}

impl WorkoutExercise {
    pub fn from_detail(detail: &SessionExerciseDetail) -> Self {
        Self {
            exercise_id: detail.exercise_id,
            name: detail.exercise_name.clone(),
            reps: detail.reps.unwrap_or(0),
            planned_reps: detail.reps,
        }
    }

    pub fn increment(&mut self) {
        self.reps = self.reps.saturating_add(1);
    }

    pub fn decrement(&mut self) {
        self.reps = self.reps.saturating_sub(1);
    }

    /// Typed input; anything that is not a whole number counts as 0
    pub fn set_reps_from_input(&mut self, input: &str) {
        self.reps = input.trim().parse().unwrap_or(0);
    }
}

pub fn total_reps(exercises: &[WorkoutExercise]) -> u64 {
    exercises.iter().map(|e| u64::from(e.reps)).sum()
}

/// Lookup results captured when the workout screen loaded
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryContext {
    pub session_id: SessionId,
    pub session_name: String,
    pub session_type: SessionType,
    pub program_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseResult {
    pub exercise_id: ExerciseId,
    pub name: String,
    pub reps: u32,
    pub planned_reps: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutSummary {
    pub session_id: SessionId,
    pub session_name: String,
    pub session_type: SessionType,
    pub program_name: String,
    pub total_seconds: u64,
    pub total_reps: u64,
    pub per_exercise: Vec<ExerciseResult>,
    pub exercise_count: usize,
}

impl WorkoutSummary {
    pub fn build(context: &SummaryContext, total_seconds: u64, exercises: &[WorkoutExercise]) -> Self {
        let per_exercise: Vec<ExerciseResult> = exercises
            .iter()
            .map(|e| ExerciseResult {
                exercise_id: e.exercise_id,
                name: e.name.clone(),
                reps: e.reps,
                planned_reps: e.planned_reps,
            })
            .collect();

        Self {
            session_id: context.session_id,
            session_name: context.session_name.clone(),
            session_type: context.session_type,
            program_name: context.program_name.clone(),
            total_seconds,
            total_reps: total_reps(exercises),
            exercise_count: per_exercise.len(),
            per_exercise,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(id: i64, name: &str, reps: u32, planned: Option<u32>) -> WorkoutExercise {
        WorkoutExercise {
            exercise_id: id,
            name: name.to_string(),
            reps,
            planned_reps: planned,
        }
    }

    fn context() -> SummaryContext {
        SummaryContext {
            session_id: 4,
            session_name: "Friday AMRAP".into(),
            session_type: SessionType::Amrap,
            program_name: "Summer cut".into(),
        }
    }

    #[test]
    fn build_sums_reps_and_copies_context() {
        let exercises = vec![
            exercise(1, "Burpees", 30, Some(25)),
            exercise(2, "Pull-ups", 12, None),
            exercise(3, "Air squats", 0, Some(50)),
        ];
        let summary = WorkoutSummary::build(&context(), 754, &exercises);

        assert_eq!(summary.total_seconds, 754);
        assert_eq!(summary.total_reps, 42);
        assert_eq!(summary.exercise_count, 3);
        assert_eq!(summary.program_name, "Summer cut");
        assert_eq!(summary.per_exercise[1].name, "Pull-ups");
        assert_eq!(summary.per_exercise[1].planned_reps, None);
        assert_eq!(summary.per_exercise[2].planned_reps, Some(50));
    }

    #[test]
    fn later_edits_do_not_change_summary() {
        let mut exercises = vec![exercise(1, "Burpees", 10, Some(10))];
        let summary = WorkoutSummary::build(&context(), 60, &exercises);

        exercises[0].reps = 99;
        exercises.push(exercise(2, "Row", 5, None));

        assert_eq!(summary.total_reps, 10);
        assert_eq!(summary.per_exercise.len(), 1);
    }

    #[test]
    fn empty_exercise_list() {
        let summary = WorkoutSummary::build(&context(), 0, &[]);
        assert_eq!(summary.total_reps, 0);
        assert_eq!(summary.exercise_count, 0);
    }

    #[test]
    fn reps_editing() {
        let mut e = exercise(1, "Burpees", 0, None);
        e.decrement();
        assert_eq!(e.reps, 0);
        e.increment();
        e.increment();
        assert_eq!(e.reps, 2);
        e.set_reps_from_input(" 17 ");
        assert_eq!(e.reps, 17);
        e.set_reps_from_input("abc");
        assert_eq!(e.reps, 0);
    }

    #[test]
    fn from_detail_defaults_reps_to_plan() {
        let detail = SessionExerciseDetail {
            id: 1,
            session_id: 4,
            exercise_id: 8,
            order_index: 0,
            sets: Some(3),
            reps: Some(15),
            duration: None,
            rest_time: None,
            exercise_name: "Lunges".into(),
            exercise_category: crate::session::ExerciseCategory::Strength,
        };
        let e = WorkoutExercise::from_detail(&detail);
        assert_eq!(e.reps, 15);
        assert_eq!(e.planned_reps, Some(15));

        let free = WorkoutExercise::from_detail(&SessionExerciseDetail {
            reps: None,
            ..detail
        });
        assert_eq!(free.reps, 0);
        assert_eq!(free.planned_reps, None);
    }
}
