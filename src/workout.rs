//! Active workout state and its four transitions.
//!
//! `WorkoutStore` is the single owner of the in-progress workout. Screens read
//! it through `state()` and change it only via `start`, `pause`, `resume` and
//! `finish`. Timing is kept as an absolute segment start plus the milliseconds
//! accumulated by earlier segments, so elapsed time can be recomputed at any
//! instant, including after the process was suspended or relaunched.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::app_dirs::AppDirs;
use crate::clock::{Clock, SystemClock};
use crate::elapsed;
use crate::session::{SessionId, SessionType};

/// Upper bound on a plausible accumulated workout (one year)
pub const MAX_ACCUMULATED_MS: i64 = 365 * 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkoutPhase {
    Idle,
    Running,
    Paused,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WorkoutState {
    active_session_id: Option<SessionId>,
    session_name: Option<String>,
    session_type: Option<SessionType>,
    started_at: Option<i64>,
    elapsed_before_pause: i64,
    is_paused: bool,
}

impl WorkoutState {
    pub fn active_session_id(&self) -> Option<SessionId> {
        self.active_session_id
    }

    pub fn session_name(&self) -> Option<&str> {
        self.session_name.as_deref()
    }

    pub fn session_type(&self) -> Option<SessionType> {
        self.session_type
    }

    /// Start of the current running segment, absent while paused or idle
    pub fn started_at(&self) -> Option<i64> {
        self.started_at
    }

    /// Milliseconds accumulated by all finished running segments
    pub fn elapsed_before_pause(&self) -> i64 {
        self.elapsed_before_pause
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    pub fn is_active(&self) -> bool {
        self.active_session_id.is_some()
    }

    pub fn phase(&self) -> WorkoutPhase {
        match (self.active_session_id, self.is_paused) {
            (None, _) => WorkoutPhase::Idle,
            (Some(_), true) => WorkoutPhase::Paused,
            (Some(_), false) => WorkoutPhase::Running,
        }
    }

    /// Active => exactly one of {segment running, paused}; idle => neither.
    /// Timestamps must be plausible epoch milliseconds.
    pub fn is_consistent(&self) -> bool {
        let timing_ok = (0..=MAX_ACCUMULATED_MS).contains(&self.elapsed_before_pause)
            && self.started_at.map_or(true, |t| t >= 0);
        match self.active_session_id {
            Some(_) => timing_ok && (self.started_at.is_some() != self.is_paused),
            None => {
                self.started_at.is_none()
                    && !self.is_paused
                    && self.elapsed_before_pause == 0
                    && self.session_name.is_none()
                    && self.session_type.is_none()
            }
        }
    }

    fn start(&mut self, session_id: SessionId, name: &str, session_type: SessionType, now_ms: i64) {
        *self = WorkoutState {
            active_session_id: Some(session_id),
            session_name: Some(name.to_string()),
            session_type: Some(session_type),
            started_at: Some(now_ms),
            elapsed_before_pause: 0,
            is_paused: false,
        };
    }

    fn pause(&mut self, now_ms: i64) -> Transition {
        if self.phase() != WorkoutPhase::Running {
            return Transition::Ignored;
        }
        if let Some(started_at) = self.started_at.take() {
            self.elapsed_before_pause = self
                .elapsed_before_pause
                .saturating_add(now_ms.saturating_sub(started_at).max(0));
        }
        self.is_paused = true;
        Transition::Applied
    }

    fn resume(&mut self, now_ms: i64) -> Transition {
        if self.phase() != WorkoutPhase::Paused {
            return Transition::Ignored;
        }
        self.started_at = Some(now_ms);
        self.is_paused = false;
        Transition::Applied
    }

    fn finish(&mut self) -> Transition {
        let was_active = self.is_active();
        *self = WorkoutState::default();
        if was_active {
            Transition::Applied
        } else {
            Transition::Ignored
        }
    }
}

/// Result of `WorkoutStore::start`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// A workout is already in progress; nothing was changed.
    AlreadyActive { session_id: SessionId },
}

/// Result of pause/resume/finish; invalid-state calls are silent no-ops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    Ignored,
}

impl Transition {
    pub fn applied(self) -> bool {
        self == Transition::Applied
    }
}

/// Persistence for the active workout between process runs
pub trait SnapshotStore {
    fn load(&self) -> Option<WorkoutState>;
    fn save(&self, state: &WorkoutState) -> io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::workout_snapshot_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load(&self) -> Option<WorkoutState> {
        let bytes = fs::read(&self.path).ok()?;
        match serde_json::from_slice::<WorkoutState>(&bytes) {
            Ok(state) => Some(state),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring unreadable workout snapshot");
                None
            }
        }
    }

    fn save(&self, state: &WorkoutState) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(state).map_err(io::Error::other)?;
        fs::write(&self.path, data)
    }
}

/// Injectable owner of the workout state
pub struct WorkoutStore<C: Clock = SystemClock> {
    state: WorkoutState,
    clock: C,
    snapshots: Option<Box<dyn SnapshotStore>>,
}

impl<C: Clock> WorkoutStore<C> {
    pub fn new(clock: C) -> Self {
        Self {
            state: WorkoutState::default(),
            clock,
            snapshots: None,
        }
    }

    /// Restore the last saved workout (if any) and persist every applied transition
    pub fn with_snapshots(clock: C, snapshots: Box<dyn SnapshotStore>) -> Self {
        let state = match snapshots.load() {
            Some(state) if state.is_consistent() => {
                if let Some(id) = state.active_session_id() {
                    info!(session_id = id, paused = state.is_paused(), "restored active workout");
                }
                state
            }
            Some(_) => {
                warn!("discarding inconsistent workout snapshot");
                WorkoutState::default()
            }
            None => WorkoutState::default(),
        };
        Self {
            state,
            clock,
            snapshots: Some(snapshots),
        }
    }

    pub fn state(&self) -> &WorkoutState {
        &self.state
    }

    pub fn phase(&self) -> WorkoutPhase {
        self.state.phase()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// Live elapsed seconds, net of paused time
    pub fn elapsed_seconds(&self) -> u64 {
        elapsed::elapsed_seconds(&self.state, self.clock.now_ms())
    }

    pub fn start(&mut self, session_id: SessionId, name: &str, session_type: SessionType) -> StartOutcome {
        if let Some(active) = self.state.active_session_id() {
            debug!(requested = session_id, active, "start ignored: workout already active");
            return StartOutcome::AlreadyActive { session_id: active };
        }
        self.state.start(session_id, name, session_type, self.clock.now_ms());
        info!(session_id, name, %session_type, "workout started");
        self.persist();
        StartOutcome::Started
    }

    pub fn pause(&mut self) -> Transition {
        let t = self.state.pause(self.clock.now_ms());
        self.after("pause", t)
    }

    pub fn resume(&mut self) -> Transition {
        let t = self.state.resume(self.clock.now_ms());
        self.after("resume", t)
    }

    /// Clears all timing data. Build any summary before calling this.
    pub fn finish(&mut self) -> Transition {
        let t = self.state.finish();
        self.after("finish", t)
    }

    fn after(&self, name: &'static str, t: Transition) -> Transition {
        match t {
            Transition::Applied => {
                info!(
                    transition = name,
                    elapsed_before_pause = self.state.elapsed_before_pause(),
                    "workout transition"
                );
                self.persist();
            }
            Transition::Ignored => debug!(transition = name, "transition ignored"),
        }
        t
    }

    fn persist(&self) {
        if let Some(snapshots) = &self.snapshots {
            if let Err(e) = snapshots.save(&self.state) {
                warn!(error = %e, "failed to save workout snapshot");
            }
        }
    }
}

impl Default for WorkoutStore<SystemClock> {
    fn default() -> Self {
        Self::new(SystemClock)
    }
}
