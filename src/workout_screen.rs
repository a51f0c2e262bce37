//! Screen-level wiring for a live workout.
//!
//! `WorkoutScreen` owns the transient exercise list and the summary, reads the
//! shared `WorkoutStore`, and reports navigation as `ScreenAction`s for the
//! app to carry out.

use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::elapsed::ElapsedView;
use crate::feedback::{Cue, FeedbackChain};
use crate::lookup::{program_label, ProgramLookup, SessionLookup};
use crate::session::SessionId;
use crate::storage::HistoryRecorder;
use crate::summary::{total_reps, SummaryContext, WorkoutExercise, WorkoutSummary};
use crate::workout::{StartOutcome, WorkoutPhase, WorkoutStore};

/// Longest reps value accepted from the keyboard
const MAX_INPUT_DIGITS: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub enum ScreenView {
    /// Session or exercises could not be loaded
    Loading,
    /// A different workout is in progress
    Conflict {
        active_session_id: SessionId,
        active_name: String,
    },
    Active,
    ConfirmFinish,
    Summary(WorkoutSummary),
}

/// Navigation requested by the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenAction {
    None,
    NavigateBack,
    OpenWorkout(SessionId),
}

#[derive(Debug)]
pub struct WorkoutScreen {
    session_id: SessionId,
    context: Option<SummaryContext>,
    planned_minutes: Option<u32>,
    exercises: Vec<WorkoutExercise>,
    selected: usize,
    reps_input: Option<String>,
    elapsed: ElapsedView,
    view: ScreenView,
}

impl WorkoutScreen {
    /// Loads everything the workout needs up front. Any failure leaves the
    /// screen in `Loading`.
    pub fn open<L>(session_id: SessionId, lookup: &L) -> Self
    where
        L: SessionLookup + ProgramLookup + ?Sized,
    {
        let mut screen = Self {
            session_id,
            context: None,
            planned_minutes: None,
            exercises: Vec::new(),
            selected: 0,
            reps_input: None,
            elapsed: ElapsedView::default(),
            view: ScreenView::Loading,
        };

        let loaded = lookup.session(session_id).and_then(|session| match session {
            Some(session) => {
                let details = lookup.session_exercises(session_id)?;
                let program_name = program_label(lookup, session.program_id)?;
                Ok(Some((session, details, program_name)))
            }
            None => Ok(None),
        });

        match loaded {
            Ok(Some((session, details, program_name))) if !details.is_empty() => {
                screen.planned_minutes = session.duration;
                screen.exercises = details.iter().map(WorkoutExercise::from_detail).collect();
                screen.context = Some(SummaryContext {
                    session_id,
                    session_name: session.name,
                    session_type: session.session_type,
                    program_name,
                });
                screen.view = ScreenView::Active;
            }
            Ok(Some(_)) => warn!(session_id, "session has no exercises"),
            Ok(None) => warn!(session_id, "session not found"),
            Err(e) => warn!(session_id, error = %e, "failed to load session"),
        }
        screen
    }

    /// Attach to this session's workout, starting it when nothing is active.
    /// Never replaces a different active workout.
    pub fn ensure_started<C: Clock>(&mut self, store: &mut WorkoutStore<C>) {
        let Some(context) = &self.context else {
            return;
        };
        if self.view != ScreenView::Active {
            return;
        }
        match store.start(self.session_id, &context.session_name, context.session_type) {
            StartOutcome::Started => {}
            StartOutcome::AlreadyActive { session_id } if session_id == self.session_id => {
                debug!(session_id, "attached to running workout");
            }
            StartOutcome::AlreadyActive { session_id } => {
                self.view = ScreenView::Conflict {
                    active_session_id: session_id,
                    active_name: store.state().session_name().unwrap_or_default().to_string(),
                };
            }
        }
        self.refresh(store);
    }

    /// Recompute elapsed time from the stored timestamps
    pub fn refresh<C: Clock>(&mut self, store: &WorkoutStore<C>) -> u64 {
        if store.state().active_session_id() == Some(self.session_id) {
            self.elapsed.refresh(store.state(), store.now_ms())
        } else {
            self.elapsed.seconds()
        }
    }

    /// True while the timer on screen is live
    pub fn wants_ticks(&self) -> bool {
        self.view == ScreenView::Active && self.elapsed.wants_ticks()
    }

    pub fn toggle_pause<C: Clock>(&mut self, store: &mut WorkoutStore<C>, feedback: &mut FeedbackChain) {
        if self.view != ScreenView::Active || !self.owns_workout(store) {
            return;
        }
        match store.phase() {
            WorkoutPhase::Running => {
                if store.pause().applied() {
                    feedback.signal(Cue::Pause);
                }
            }
            WorkoutPhase::Paused => {
                if store.resume().applied() {
                    feedback.signal(Cue::Resume);
                }
            }
            WorkoutPhase::Idle => {}
        }
        self.refresh(store);
    }

    /// Pause and ask for confirmation
    pub fn request_finish<C: Clock>(&mut self, store: &mut WorkoutStore<C>) {
        if self.view != ScreenView::Active || !self.owns_workout(store) {
            return;
        }
        self.commit_input();
        store.pause();
        self.refresh(store);
        self.view = ScreenView::ConfirmFinish;
    }

    /// Back out of the confirmation and keep going
    pub fn cancel_finish<C: Clock>(&mut self, store: &mut WorkoutStore<C>, feedback: &mut FeedbackChain) {
        if self.view != ScreenView::ConfirmFinish {
            return;
        }
        if store.resume().applied() {
            feedback.signal(Cue::Resume);
        }
        self.refresh(store);
        self.view = ScreenView::Active;
    }

    /// Freeze the results. The workout itself stays in the store until the
    /// summary is closed.
    pub fn confirm_finish<C: Clock>(&mut self, store: &mut WorkoutStore<C>, feedback: &mut FeedbackChain) {
        if self.view != ScreenView::ConfirmFinish {
            return;
        }
        let total_seconds = self.refresh(store);
        let Some(context) = &self.context else {
            return;
        };
        let summary = WorkoutSummary::build(context, total_seconds, &self.exercises);
        info!(
            session_id = summary.session_id,
            total_seconds,
            total_reps = summary.total_reps,
            "workout confirmed"
        );
        feedback.signal(Cue::Finish);
        self.view = ScreenView::Summary(summary);
    }

    /// Clear the workout, optionally keep the result, and leave the screen
    pub fn close_summary<C: Clock>(
        &mut self,
        store: &mut WorkoutStore<C>,
        history: Option<&dyn HistoryRecorder>,
    ) -> ScreenAction {
        let ScreenView::Summary(summary) = &self.view else {
            return ScreenAction::None;
        };
        if store.state().active_session_id() == Some(self.session_id) {
            store.finish();
        }
        if let Some(history) = history {
            if let Err(e) = history.record_workout(summary) {
                warn!(error = %e, "failed to record workout history");
            }
        }
        ScreenAction::NavigateBack
    }

    /// Leave without finishing; a running workout keeps running
    pub fn back(&mut self) -> ScreenAction {
        match self.view {
            ScreenView::Loading | ScreenView::Conflict { .. } | ScreenView::Active => {
                self.reps_input = None;
                ScreenAction::NavigateBack
            }
            ScreenView::ConfirmFinish | ScreenView::Summary(_) => ScreenAction::None,
        }
    }

    /// From the conflict view, jump to the workout that is actually running
    pub fn open_active(&self) -> ScreenAction {
        match &self.view {
            ScreenView::Conflict {
                active_session_id, ..
            } => ScreenAction::OpenWorkout(*active_session_id),
            _ => ScreenAction::None,
        }
    }

    pub fn select_next(&mut self) {
        if self.editable() && !self.exercises.is_empty() {
            self.commit_input();
            self.selected = (self.selected + 1) % self.exercises.len();
        }
    }

    pub fn select_prev(&mut self) {
        if self.editable() && !self.exercises.is_empty() {
            self.commit_input();
            self.selected = (self.selected + self.exercises.len() - 1) % self.exercises.len();
        }
    }

    pub fn increment(&mut self) {
        if self.editable() {
            self.commit_input();
            if let Some(e) = self.exercises.get_mut(self.selected) {
                e.increment();
            }
        }
    }

    pub fn decrement(&mut self) {
        if self.editable() {
            self.commit_input();
            if let Some(e) = self.exercises.get_mut(self.selected) {
                e.decrement();
            }
        }
    }

    /// Typed reps for the selected exercise, applied on `commit_input`
    pub fn push_digit(&mut self, c: char) {
        if !self.editable() || !c.is_ascii_digit() {
            return;
        }
        let input = self.reps_input.get_or_insert_with(String::new);
        if input.len() < MAX_INPUT_DIGITS {
            input.push(c);
        }
    }

    pub fn pop_digit(&mut self) {
        if let Some(input) = &mut self.reps_input {
            input.pop();
        }
    }

    pub fn commit_input(&mut self) {
        if let Some(input) = self.reps_input.take() {
            if let Some(e) = self.exercises.get_mut(self.selected) {
                e.set_reps_from_input(&input);
            }
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn view(&self) -> &ScreenView {
        &self.view
    }

    pub fn context(&self) -> Option<&SummaryContext> {
        self.context.as_ref()
    }

    pub fn planned_minutes(&self) -> Option<u32> {
        self.planned_minutes
    }

    pub fn exercises(&self) -> &[WorkoutExercise] {
        &self.exercises
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn reps_input(&self) -> Option<&str> {
        self.reps_input.as_deref()
    }

    pub fn total_reps(&self) -> u64 {
        total_reps(&self.exercises)
    }

    pub fn elapsed_label(&self) -> String {
        self.elapsed.label()
    }

    pub fn summary(&self) -> Option<&WorkoutSummary> {
        match &self.view {
            ScreenView::Summary(summary) => Some(summary),
            _ => None,
        }
    }

    fn editable(&self) -> bool {
        self.view == ScreenView::Active
    }

    fn owns_workout<C: Clock>(&self, store: &WorkoutStore<C>) -> bool {
        store.state().active_session_id() == Some(self.session_id)
    }
}
