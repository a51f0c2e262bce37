use pushit::summary::ExerciseResult;
use pushit::util::truncate;

/// Widest exercise label under a bar group
const LABEL_WIDTH: usize = 9;

/// Done/planned pair for one exercise in the summary chart
#[derive(Debug, Clone, PartialEq)]
pub struct RepsBars {
    pub label: String,
    pub done: u64,
    pub planned: Option<u64>,
}

pub fn reps_bars(per_exercise: &[ExerciseResult]) -> Vec<RepsBars> {
    per_exercise
        .iter()
        .map(|e| RepsBars {
            label: truncate(&e.name, LABEL_WIDTH),
            done: u64::from(e.reps),
            planned: e.planned_reps.map(u64::from),
        })
        .collect()
}

/// Y bound shared by done and planned bars; never zero
pub fn chart_max(per_exercise: &[ExerciseResult]) -> u64 {
    per_exercise
        .iter()
        .map(|e| u64::from(e.reps.max(e.planned_reps.unwrap_or(0))))
        .max()
        .unwrap_or(0)
        .max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, reps: u32, planned: Option<u32>) -> ExerciseResult {
        ExerciseResult {
            exercise_id: 1,
            name: name.to_string(),
            reps,
            planned_reps: planned,
        }
    }

    #[test]
    fn test_chart_max_empty() {
        assert_eq!(chart_max(&[]), 1);
        assert_eq!(chart_max(&[result("Plank", 0, None)]), 1);
    }

    #[test]
    fn test_chart_max_uses_plan_when_higher() {
        let data = [result("Burpees", 12, Some(20)), result("Squats", 30, None)];
        assert_eq!(chart_max(&data), 30);
        assert_eq!(chart_max(&data[..1]), 20);
    }

    #[test]
    fn test_reps_bars_labels_are_truncated() {
        let bars = reps_bars(&[result("Mountain climbers", 40, Some(50))]);
        assert_eq!(bars[0].label, "Mountain…");
        assert_eq!(bars[0].done, 40);
        assert_eq!(bars[0].planned, Some(50));
    }
}
