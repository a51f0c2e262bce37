use crate::workout::{WorkoutPhase, WorkoutState};

/// Milliseconds of running time, net of pauses, at `now_ms`
pub fn elapsed_millis(state: &WorkoutState, now_ms: i64) -> i64 {
    if !state.is_active() {
        return 0;
    }
    let running = match (state.is_paused(), state.started_at()) {
        (false, Some(started_at)) => now_ms.saturating_sub(started_at).max(0),
        _ => 0,
    };
    state.elapsed_before_pause().saturating_add(running)
}

pub fn elapsed_seconds(state: &WorkoutState, now_ms: i64) -> u64 {
    (elapsed_millis(state, now_ms).max(0) / 1000) as u64
}

/// `MM:SS`, with minutes allowed to grow past 59
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// A view's cached projection of the workout clock.
///
/// The view calls `refresh` whenever it is woken (tick, key, focus regained)
/// and asks `wants_ticks` to decide whether it needs periodic wake-ups at all.
#[derive(Debug, Clone, Default)]
pub struct ElapsedView {
    seconds: u64,
    ticking: bool,
}

impl ElapsedView {
    pub fn refresh(&mut self, state: &WorkoutState, now_ms: i64) -> u64 {
        self.seconds = elapsed_seconds(state, now_ms);
        self.ticking = state.phase() == WorkoutPhase::Running;
        self.seconds
    }

    pub fn seconds(&self) -> u64 {
        self.seconds
    }

    pub fn wants_ticks(&self) -> bool {
        self.ticking
    }

    pub fn label(&self) -> String {
        format_clock(self.seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};
    use crate::session::SessionType;
    use crate::workout::WorkoutStore;

    const T: i64 = 1_700_000_000_000;

    #[test]
    fn idle_projects_zero() {
        let state = WorkoutState::default();
        assert_eq!(elapsed_seconds(&state, T), 0);
    }

    #[test]
    fn paused_projection_ignores_wall_clock() {
        let clock = ManualClock::new(T);
        let mut store = WorkoutStore::new(clock.clone());
        store.start(1, "Core", SessionType::Amrap);
        clock.advance(65_000);
        store.pause();
        assert_eq!(store.state().elapsed_before_pause(), 65_000);

        assert_eq!(elapsed_seconds(store.state(), clock.now_ms()), 65);
        assert_eq!(elapsed_seconds(store.state(), clock.now_ms() + 3_600_000), 65);
    }

    #[test]
    fn extreme_timestamps_saturate() {
        let state: WorkoutState = serde_json::from_str(
            r#"{"active_session_id":1,"session_name":"x","session_type":"EMOM",
                "started_at":-9223372036854775808,"elapsed_before_pause":0,"is_paused":false}"#,
        )
        .unwrap();
        assert_eq!(elapsed_millis(&state, T), i64::MAX);

        let state: WorkoutState = serde_json::from_str(
            r#"{"active_session_id":1,"session_name":"x","session_type":"EMOM",
                "started_at":0,"elapsed_before_pause":9223372036854775807,"is_paused":false}"#,
        )
        .unwrap();
        assert_eq!(elapsed_millis(&state, T), i64::MAX);
    }

    #[test]
    fn running_projection_floors_to_seconds() {
        let clock = ManualClock::new(T);
        let mut store = WorkoutStore::new(clock);
        store.start(1, "Core", SessionType::Amrap);

        assert_eq!(elapsed_seconds(store.state(), T + 90_000), 90);
        assert_eq!(elapsed_seconds(store.state(), T + 90_999), 90);
        assert_eq!(elapsed_millis(store.state(), T + 999), 999);
        assert_eq!(elapsed_seconds(store.state(), T - 5_000), 0);
    }

    #[test]
    fn view_ticks_only_while_running() {
        let clock = ManualClock::new(T);
        let mut store = WorkoutStore::new(clock.clone());
        let mut view = ElapsedView::default();

        view.refresh(store.state(), clock.now_ms());
        assert!(!view.wants_ticks());

        store.start(1, "Core", SessionType::Amrap);
        clock.advance(2_000);
        assert_eq!(view.refresh(store.state(), clock.now_ms()), 2);
        assert!(view.wants_ticks());

        store.pause();
        view.refresh(store.state(), clock.now_ms());
        assert!(!view.wants_ticks());
        assert_eq!(view.label(), "00:02");
    }

    #[test]
    fn clock_format() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(65), "01:05");
        assert_eq!(format_clock(3661), "61:01");
    }
}
