mod commands;
pub mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{DisableFocusChange, EnableFocusChange, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use pushit::{
    app_dirs::AppDirs,
    clock::{Clock, SystemClock},
    config::{Config, ConfigStore, FileConfigStore},
    elapsed::ElapsedView,
    feedback::{Cue, FeedbackChain, TerminalBell},
    logging,
    navigation::{Navigator, Route},
    runtime::{AppEvent, CrosstermEventSource, EventSource, FixedTicker, Runner, Ticker},
    session::{Program, Session, SessionExerciseDetail},
    storage::{Database, HistoryEntry, HistoryRecorder},
    workout::{FileSnapshotStore, WorkoutPhase, WorkoutStore},
    workout_screen::{ScreenAction, ScreenView, WorkoutScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
};
use tracing::{info, warn};

use crate::commands::Command;

const HISTORY_SCREEN_LIMIT: usize = 50;

/// workout programs, sessions and a live AMRAP/HIIT/EMOM timer in your terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Plan workout programs and sessions, then run them with a live timer that survives suspends and restarts. Run without a subcommand to open the TUI."
)]
pub struct Cli {
    /// database file to use instead of the default
    #[clap(long, global = true)]
    db: Option<PathBuf>,

    /// turn off the terminal bell cue on pause/resume/finish
    #[clap(long, global = true)]
    no_sound: bool,

    /// timer refresh interval in milliseconds while running (max 1000)
    #[clap(long, global = true)]
    refresh_ms: Option<u64>,

    #[clap(subcommand)]
    command: Option<Command>,
}

impl Cli {
    /// Config file values with this run's flags applied on top
    fn apply(&self, mut config: Config) -> Config {
        if self.no_sound {
            config.sound = false;
        }
        if let Some(ms) = self.refresh_ms {
            config.refresh_interval_ms = ms;
        }
        config
    }

    fn db_path(&self) -> PathBuf {
        self.db.clone().unwrap_or_else(AppDirs::db_path)
    }

    /// The active-workout snapshot sits next to whichever database is in use
    fn snapshot_store(&self) -> FileSnapshotStore {
        match &self.db {
            Some(db) => FileSnapshotStore::with_path(db.with_file_name("active_workout.json")),
            None => FileSnapshotStore::new(),
        }
    }
}

/// Data behind the current route
#[derive(Debug)]
pub enum View {
    Programs {
        programs: Vec<Program>,
        selected: usize,
    },
    Sessions {
        title: String,
        sessions: Vec<Session>,
        selected: usize,
    },
    SessionDetail {
        session: Option<Session>,
        program: String,
        exercises: Vec<SessionExerciseDetail>,
    },
    Workout(WorkoutScreen),
    History {
        entries: Vec<HistoryEntry>,
        selected: usize,
    },
}

impl View {
    fn rows(&self) -> usize {
        match self {
            // Programs plus the "Unassigned sessions" and "History" entries
            View::Programs { programs, .. } => programs.len() + 2,
            View::Sessions { sessions, .. } => sessions.len(),
            View::History { entries, .. } => entries.len(),
            View::SessionDetail { .. } | View::Workout(_) => 0,
        }
    }

    fn selected_mut(&mut self) -> Option<&mut usize> {
        match self {
            View::Programs { selected, .. }
            | View::Sessions { selected, .. }
            | View::History { selected, .. } => Some(selected),
            View::SessionDetail { .. } | View::Workout(_) => None,
        }
    }
}

pub struct App<C: Clock = SystemClock> {
    pub db: Database,
    pub store: WorkoutStore<C>,
    pub feedback: FeedbackChain,
    pub config: Config,
    pub nav: Navigator,
    pub view: View,
    pub banner: ElapsedView,
    pub flash: Option<Cue>,
    pub message: Option<String>,
}

impl<C: Clock> App<C> {
    pub fn new(db: Database, store: WorkoutStore<C>, feedback: FeedbackChain, config: Config) -> Self {
        let mut app = Self {
            db,
            store,
            feedback,
            config,
            nav: Navigator::default(),
            view: View::Programs {
                programs: Vec::new(),
                selected: 0,
            },
            banner: ElapsedView::default(),
            flash: None,
            message: None,
        };
        app.reload();
        if app.config.resume_on_launch {
            if let Some(id) = app.store.state().active_session_id() {
                info!(session_id = id, "reopening active workout");
                app.open(Route::Workout(id));
            }
        }
        app.refresh();
        app
    }

    pub fn open(&mut self, route: Route) {
        self.nav.push(route);
        self.reload();
    }

    pub fn back(&mut self) {
        if self.nav.back() {
            self.reload();
        }
    }

    fn reload(&mut self) {
        self.message = None;
        self.view = self.load_view(self.nav.current());
        if let View::Workout(screen) = &mut self.view {
            screen.ensure_started(&mut self.store);
        }
        self.refresh();
    }

    fn load_view(&mut self, route: Route) -> View {
        let loaded = match route {
            Route::Programs => self.db.programs().map(|programs| View::Programs {
                programs,
                selected: 0,
            }),
            Route::Program(id) => self.db.program(id).and_then(|program| {
                let title = program.map(|p| p.name).unwrap_or_else(|| format!("Program {id}"));
                Ok(View::Sessions {
                    title,
                    sessions: self.db.sessions_by_program(id)?,
                    selected: 0,
                })
            }),
            Route::Unassigned => self.db.unassigned_sessions().map(|sessions| View::Sessions {
                title: "Unassigned sessions".to_string(),
                sessions,
                selected: 0,
            }),
            Route::Session(id) => self.db.session(id).and_then(|session| {
                let program = pushit::lookup::program_label(&self.db, session.as_ref().and_then(|s| s.program_id))?;
                Ok(View::SessionDetail {
                    session,
                    program,
                    exercises: self.db.session_exercises(id)?,
                })
            }),
            Route::Workout(id) => Ok(View::Workout(WorkoutScreen::open(id, &self.db))),
            Route::History => self
                .db
                .recent_workouts(HISTORY_SCREEN_LIMIT)
                .map(|entries| View::History { entries, selected: 0 }),
        };

        loaded.unwrap_or_else(|e| {
            warn!(?route, error = %e, "failed to load screen");
            self.message = Some(e.to_string());
            View::Sessions {
                title: "Error".to_string(),
                sessions: Vec::new(),
                selected: 0,
            }
        })
    }

    /// Recompute every displayed elapsed value from the stored timestamps
    pub fn refresh(&mut self) {
        self.banner.refresh(self.store.state(), self.store.now_ms());
        if let View::Workout(screen) = &mut self.view {
            screen.refresh(&self.store);
        }
    }

    /// Periodic wake-ups are only needed while a visible timer is running
    pub fn wants_ticks(&self) -> bool {
        match &self.view {
            View::Workout(screen) => match screen.view() {
                ScreenView::Loading | ScreenView::Conflict { .. } => self.banner.wants_ticks(),
                _ => screen.wants_ticks(),
            },
            _ => self.banner.wants_ticks(),
        }
    }

    /// True when the banner with the active workout should be drawn
    pub fn shows_banner(&self) -> bool {
        let on_own_workout = matches!(
            &self.view,
            View::Workout(screen) if screen.view() != &ScreenView::Loading
                && !matches!(screen.view(), ScreenView::Conflict { .. })
        );
        self.store.phase() != WorkoutPhase::Idle && !on_own_workout
    }

    fn handle_action(&mut self, action: ScreenAction) {
        match action {
            ScreenAction::None => {}
            ScreenAction::NavigateBack => self.back(),
            ScreenAction::OpenWorkout(id) => self.open(Route::Workout(id)),
        }
    }

    /// Returns true when the app should quit
    pub fn on_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }
        self.flash = None;

        if let View::Workout(_) = self.view {
            self.on_workout_key(key);
        } else {
            match key.code {
                KeyCode::Char('q') => return true,
                KeyCode::Esc | KeyCode::Backspace | KeyCode::Left => self.back(),
                KeyCode::Up | KeyCode::Char('k') => {
                    if let Some(selected) = self.view.selected_mut() {
                        *selected = selected.saturating_sub(1);
                    }
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    let rows = self.view.rows();
                    if let Some(selected) = self.view.selected_mut() {
                        if *selected + 1 < rows {
                            *selected += 1;
                        }
                    }
                }
                KeyCode::Enter | KeyCode::Right => self.enter(),
                KeyCode::Char('s') => {
                    if let View::SessionDetail {
                        session: Some(session),
                        ..
                    } = &self.view
                    {
                        let id = session.id;
                        self.open(Route::Workout(id));
                    }
                }
                KeyCode::Char('h') => self.open(Route::History),
                KeyCode::Char('w') => {
                    if let Some(id) = self.store.state().active_session_id() {
                        self.open(Route::Workout(id));
                    }
                }
                _ => {}
            }
        }

        if let Some(cue) = self.feedback.take_flash() {
            self.flash = Some(cue);
        }
        self.refresh();
        false
    }

    fn enter(&mut self) {
        let route = match &self.view {
            View::Programs { programs, selected } => match programs.get(*selected) {
                Some(p) => Some(Route::Program(p.id)),
                None if *selected == programs.len() => Some(Route::Unassigned),
                None => Some(Route::History),
            },
            View::Sessions { sessions, selected, .. } => sessions.get(*selected).map(|s| Route::Session(s.id)),
            _ => None,
        };
        if let Some(route) = route {
            self.open(route);
        }
    }

    fn on_workout_key(&mut self, key: KeyEvent) {
        let View::Workout(screen) = &mut self.view else {
            return;
        };
        let action = match screen.view() {
            ScreenView::Loading => match key.code {
                KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('q') => screen.back(),
                _ => ScreenAction::None,
            },
            ScreenView::Conflict { .. } => match key.code {
                KeyCode::Char('w') | KeyCode::Enter => screen.open_active(),
                KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('q') => screen.back(),
                _ => ScreenAction::None,
            },
            ScreenView::Active => {
                match key.code {
                    KeyCode::Char(' ') | KeyCode::Char('p') => {
                        screen.commit_input();
                        screen.toggle_pause(&mut self.store, &mut self.feedback);
                    }
                    KeyCode::Char('f') => screen.request_finish(&mut self.store),
                    KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Right => screen.increment(),
                    KeyCode::Char('-') | KeyCode::Left => screen.decrement(),
                    KeyCode::Up | KeyCode::Char('k') => screen.select_prev(),
                    KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => screen.select_next(),
                    KeyCode::Char(c) if c.is_ascii_digit() => screen.push_digit(c),
                    KeyCode::Enter => screen.commit_input(),
                    KeyCode::Backspace if screen.reps_input().is_some() => screen.pop_digit(),
                    KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('q') => {
                        screen.commit_input();
                        return self.handle_action(ScreenAction::NavigateBack);
                    }
                    _ => {}
                }
                ScreenAction::None
            }
            ScreenView::ConfirmFinish => {
                match key.code {
                    KeyCode::Char('y') | KeyCode::Enter => {
                        screen.confirm_finish(&mut self.store, &mut self.feedback)
                    }
                    KeyCode::Char('n') | KeyCode::Esc => {
                        screen.cancel_finish(&mut self.store, &mut self.feedback)
                    }
                    _ => {}
                }
                ScreenAction::None
            }
            ScreenView::Summary(_) => match key.code {
                KeyCode::Enter | KeyCode::Esc | KeyCode::Char('q') => {
                    let history: Option<&dyn HistoryRecorder> =
                        self.config.record_history.then_some(&self.db as &dyn HistoryRecorder);
                    screen.close_summary(&mut self.store, history)
                }
                _ => ScreenAction::None,
            },
        };
        self.handle_action(action);
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let fallback = if cli.command.is_some() {
        logging::Fallback::Stderr
    } else {
        logging::Fallback::Off
    };
    let _log_guard = logging::init(&AppDirs::log_dir(), fallback);

    let config = cli.apply(FileConfigStore::new().load());
    let db = Database::open(cli.db_path())?;
    let store = WorkoutStore::with_snapshots(SystemClock, Box::new(cli.snapshot_store()));

    if let Some(command) = cli.command.clone() {
        let mut store = store;
        let mut feedback = if config.sound {
            FeedbackChain::new(Box::new(TerminalBell::new(io::stderr())))
        } else {
            FeedbackChain::muted()
        };
        let ctx = commands::Context {
            db: &db,
            store: &mut store,
            feedback: &mut feedback,
            record_history: config.record_history,
        };
        return commands::run(command, ctx, &mut io::stdout().lock());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let feedback = if config.sound {
        FeedbackChain::new(Box::new(TerminalBell::stdout()))
    } else {
        FeedbackChain::muted()
    };
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::from_millis(config.refresh_interval_ms()),
    );
    let mut app = App::new(db, store, feedback, config);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableFocusChange, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend, C: Clock, E: EventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App<C>,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| ui::draw(app, f))?;

    while let Some(event) = runner.step(app.wants_ticks()) {
        match event {
            AppEvent::Tick | AppEvent::Resize | AppEvent::FocusGained => app.refresh(),
            AppEvent::Key(key) => {
                if app.on_key(key) {
                    break;
                }
            }
        }
        terminal.draw(|f| ui::draw(app, f))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pushit::clock::ManualClock;
    use pushit::runtime::TestEventSource;
    use pushit::session::{NewSession, PlannedExercise, SessionType};
    use ratatui::backend::TestBackend;
    use std::sync::mpsc;

    const T0: i64 = 1_760_000_000_000;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app_with_session() -> (App<ManualClock>, ManualClock, i64) {
        let db = Database::open_in_memory().unwrap();
        let program = db.create_program("Summer cut", None).unwrap();
        let mut new = NewSession::new("Leg day", SessionType::Emom);
        new.program_id = Some(program);
        let session = db
            .create_session(
                &new,
                &[PlannedExercise::named("Squats").with_reps(15), PlannedExercise::named("Lunges")],
            )
            .unwrap();
        let clock = ManualClock::new(T0);
        let store = WorkoutStore::new(clock.clone());
        let app = App::new(db, store, FeedbackChain::muted(), Config::default());
        (app, clock, session)
    }

    fn screen_text<C: Clock>(app: &mut App<C>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| ui::draw(app, f)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer.content.iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["pushit"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.no_sound);
        assert_eq!(cli.refresh_ms, None);
        assert_eq!(cli.apply(Config::default()), Config::default());
    }

    #[test]
    fn test_cli_flags_override_config() {
        let cli = Cli::try_parse_from(["pushit", "status", "--no-sound", "--refresh-ms", "250"]).unwrap();
        assert_eq!(cli.command, Some(Command::Status));
        let cfg = cli.apply(Config::default());
        assert!(!cfg.sound);
        assert_eq!(cfg.refresh_interval_ms(), 250);
    }

    #[test]
    fn test_cli_session_add_parses_exercises_in_order() {
        let cli = Cli::try_parse_from([
            "pushit", "session", "add", "--name", "Leg day", "--type", "amrap", "--exercise",
            "Squats:15:3", "--exercise", "Plank",
        ])
        .unwrap();
        match cli.command {
            Some(Command::Session {
                action: commands::SessionCmd::Add {
                    session_type,
                    exercises,
                    ..
                },
            }) => {
                assert_eq!(session_type, SessionType::Amrap);
                assert_eq!(exercises[0].name, "Squats");
                assert_eq!(exercises[0].reps, Some(15));
                assert_eq!(exercises[0].sets, Some(3));
                assert_eq!(exercises[1].name, "Plank");
            }
            other => panic!("unexpected parse: {other:?}"),
        }
    }

    #[test]
    fn test_cli_rejects_bad_exercise_arg() {
        assert!(Cli::try_parse_from([
            "pushit", "session", "add", "--name", "x", "--type", "hiit", "--exercise", "Squats:lots"
        ])
        .is_err());
    }

    #[test]
    fn test_snapshot_follows_db_flag() {
        let cli = Cli::try_parse_from(["pushit", "--db", "/tmp/pushit-test/p.db"]).unwrap();
        assert_eq!(cli.db_path(), PathBuf::from("/tmp/pushit-test/p.db"));
    }

    #[test]
    fn test_programs_screen_lists_entries() {
        let (mut app, _, _) = app_with_session();
        let text = screen_text(&mut app);
        assert!(text.contains("Summer cut"));
        assert!(text.contains("Unassigned sessions"));
        assert!(text.contains("History"));
        assert_eq!(app.view.rows(), 3);
    }

    #[test]
    fn test_navigate_to_session_and_start() {
        let (mut app, clock, session) = app_with_session();
        app.on_key(key(KeyCode::Enter));
        assert_eq!(app.nav.current(), Route::Program(1));
        app.on_key(key(KeyCode::Enter));
        assert_eq!(app.nav.current(), Route::Session(session));
        assert!(screen_text(&mut app).contains("Every Minute On the Minute"));

        app.on_key(key(KeyCode::Char('s')));
        assert_eq!(app.nav.current(), Route::Workout(session));
        assert_eq!(app.store.phase(), WorkoutPhase::Running);
        assert!(app.wants_ticks());

        clock.advance(61_000);
        app.refresh();
        assert!(screen_text(&mut app).contains("01:01"));
    }

    #[test]
    fn test_banner_and_jump_back_to_workout() {
        let (mut app, clock, session) = app_with_session();
        app.open(Route::Workout(session));
        app.on_key(key(KeyCode::Esc));
        assert_eq!(app.nav.current(), Route::Programs);
        assert_eq!(app.store.phase(), WorkoutPhase::Running);
        assert!(app.shows_banner());

        clock.advance(5_000);
        app.refresh();
        let text = screen_text(&mut app);
        assert!(text.contains("Leg day"));
        assert!(text.contains("00:05"));

        app.on_key(key(KeyCode::Char('w')));
        assert_eq!(app.nav.current(), Route::Workout(session));
        assert!(!app.shows_banner());
    }

    #[test]
    fn test_pause_stops_ticking() {
        let (mut app, _, session) = app_with_session();
        app.open(Route::Workout(session));
        app.on_key(key(KeyCode::Char(' ')));
        assert_eq!(app.store.phase(), WorkoutPhase::Paused);
        assert!(!app.wants_ticks());
        // Muted feedback falls back to the visual flash
        assert_eq!(app.flash, Some(Cue::Pause));
        assert!(screen_text(&mut app).contains("PAUSED"));
    }

    #[test]
    fn test_finish_flow_records_history() {
        let (mut app, clock, session) = app_with_session();
        app.open(Route::Session(session));
        app.on_key(key(KeyCode::Char('s')));
        app.on_key(key(KeyCode::Char('+')));
        app.on_key(key(KeyCode::Down));
        app.on_key(key(KeyCode::Char('7')));
        clock.advance(125_000);

        app.on_key(key(KeyCode::Char('f')));
        assert!(screen_text(&mut app).contains("Finish workout?"));
        app.on_key(key(KeyCode::Char('y')));
        let text = screen_text(&mut app);
        assert!(text.contains("02:05"));
        assert!(text.contains("23"));

        app.on_key(key(KeyCode::Enter));
        assert_eq!(app.store.phase(), WorkoutPhase::Idle);
        assert_eq!(app.nav.current(), Route::Session(session));
        let history = app.db.recent_workouts(5).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].total_reps, 23);
        assert_eq!(history[0].total_time, 125);
    }

    #[test]
    fn test_resume_on_launch_opens_active_workout() {
        let (app, clock, session) = app_with_session();
        let App { db, mut store, .. } = app;
        store.start(session, "Leg day", SessionType::Emom);
        clock.advance(1_000);

        let app = App::new(db, store, FeedbackChain::muted(), Config::default());
        assert_eq!(app.nav.current(), Route::Workout(session));
        assert_eq!(app.nav.depth(), 2);
    }

    #[test]
    fn test_missing_session_shows_loading() {
        let (mut app, _, _) = app_with_session();
        app.open(Route::Workout(999));
        assert!(screen_text(&mut app).contains("Loading"));
        assert_eq!(app.store.phase(), WorkoutPhase::Idle);
        assert!(!app.wants_ticks());
        app.on_key(key(KeyCode::Esc));
        assert_eq!(app.nav.current(), Route::Programs);
    }

    #[test]
    fn test_focus_gained_recomputes_without_ticks() {
        let (mut app, clock, session) = app_with_session();
        app.open(Route::Workout(session));
        app.on_key(key(KeyCode::Char(' ')));
        // Running again, but the screen has not been refreshed since the pause
        app.store.resume();
        assert!(!app.wants_ticks());

        clock.advance(90_000);
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let (tx, rx) = mpsc::channel();
        tx.send(AppEvent::FocusGained).unwrap();
        drop(tx);
        let runner = Runner::new(TestEventSource::new(rx), FixedTicker::from_millis(5));
        start_tui(&mut terminal, &mut app, &runner).unwrap();

        let text: String = terminal.backend().buffer().content.iter().map(|c| c.symbol()).collect();
        assert!(text.contains("01:30"));
        assert!(app.wants_ticks());
    }

    #[test]
    fn test_selected_exercise_stays_visible() {
        let db = Database::open_in_memory().unwrap();
        let plan: Vec<PlannedExercise> = (1..=30)
            .map(|i| PlannedExercise::named(&format!("Move {i:02}")).with_reps(i))
            .collect();
        let session = db
            .create_session(&NewSession::new("Long circuit", SessionType::Amrap), &plan)
            .unwrap();
        let store = WorkoutStore::new(ManualClock::new(T0));
        let mut app = App::new(db, store, FeedbackChain::muted(), Config::default());
        app.open(Route::Workout(session));
        assert!(!screen_text(&mut app).contains("Move 30"));

        for _ in 0..29 {
            app.on_key(key(KeyCode::Down));
        }
        let text = screen_text(&mut app);
        assert!(text.contains("Move 30"));
        assert!(!text.contains("Move 01"));
    }

    #[test]
    fn test_banner_keeps_ticking_over_loading_screen() {
        let (mut app, _, session) = app_with_session();
        app.store.start(session, "Leg day", SessionType::Emom);
        app.open(Route::Workout(999));
        assert!(app.shows_banner());
        assert!(app.wants_ticks());
    }

    #[test]
    fn test_start_tui_exits_on_q_and_disconnect() {
        let (mut app, _, _) = app_with_session();
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();

        let (tx, rx) = mpsc::channel();
        tx.send(AppEvent::FocusGained).unwrap();
        tx.send(AppEvent::Key(key(KeyCode::Char('q')))).unwrap();
        let runner = Runner::new(TestEventSource::new(rx), FixedTicker::from_millis(5));
        start_tui(&mut terminal, &mut app, &runner).unwrap();

        drop(tx);
        let (tx, rx) = mpsc::channel::<AppEvent>();
        drop(tx);
        let runner = Runner::new(TestEventSource::new(rx), FixedTicker::from_millis(5));
        start_tui(&mut terminal, &mut app, &runner).unwrap();
    }
}
