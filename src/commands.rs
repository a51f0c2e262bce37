//! Scriptable subcommands. Each handler writes plain text to `out` so the
//! same code backs the binary and its tests.

use std::error::Error;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use clap::Subcommand;
use itertools::Itertools;

use pushit::clock::Clock;
use pushit::elapsed::format_clock;
use pushit::feedback::{Cue, FeedbackChain};
use pushit::lookup::{program_label, NO_PROGRAM_LABEL};
use pushit::session::{
    ExerciseCategory, ExerciseId, NewSession, PlannedExercise, ProgramId, Recurrence, SessionId,
    SessionType,
};
use pushit::storage::{Database, HistoryRecorder};
use pushit::summary::{SummaryContext, WorkoutExercise, WorkoutSummary};
use pushit::util::plural;
use pushit::workout::{StartOutcome, WorkoutPhase, WorkoutStore};

type CmdResult = Result<(), Box<dyn Error>>;

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// manage workout programs
    Program {
        #[command(subcommand)]
        action: ProgramCmd,
    },
    /// manage sessions and their exercises
    Session {
        #[command(subcommand)]
        action: SessionCmd,
    },
    /// manage the exercise catalog
    Exercise {
        #[command(subcommand)]
        action: ExerciseCmd,
    },
    /// start the workout for a session
    Start { session_id: SessionId },
    /// pause the active workout
    Pause,
    /// resume the paused workout
    Resume,
    /// show the active workout and its elapsed time
    Status,
    /// finish the active workout and print its summary
    Finish,
    /// list finished workouts, newest first, or show one with its reps
    History {
        /// workout id from the listing
        id: Option<i64>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// export the workout history as CSV
    Export { path: PathBuf },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ProgramCmd {
    List,
    Add {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    Rename {
        id: ProgramId,
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    Rm {
        id: ProgramId,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum SessionCmd {
    List {
        #[arg(long, conflicts_with = "unassigned")]
        program: Option<ProgramId>,
        /// only sessions outside any program
        #[arg(long)]
        unassigned: bool,
    },
    Show {
        id: SessionId,
    },
    Add {
        #[arg(long)]
        name: String,
        #[arg(long = "type", value_enum, ignore_case = true)]
        session_type: SessionType,
        #[arg(long)]
        program: Option<ProgramId>,
        /// planned length in minutes
        #[arg(long)]
        duration: Option<u32>,
        /// YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,
        /// HH:MM
        #[arg(long)]
        time: Option<String>,
        #[arg(long, value_enum, ignore_case = true, default_value_t = Recurrence::None)]
        recurrence: Recurrence,
        /// NAME[:REPS[:SETS]], repeatable and kept in order
        #[arg(long = "exercise", required = true)]
        exercises: Vec<PlannedExercise>,
    },
    /// change fields of a session; `--exercise` replaces the whole list
    Edit {
        id: SessionId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long = "type", value_enum, ignore_case = true)]
        session_type: Option<SessionType>,
        #[arg(long, conflicts_with = "unassign")]
        program: Option<ProgramId>,
        /// move the session out of its program
        #[arg(long)]
        unassign: bool,
        #[arg(long)]
        duration: Option<u32>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        time: Option<String>,
        #[arg(long, value_enum, ignore_case = true)]
        recurrence: Option<Recurrence>,
        #[arg(long = "exercise")]
        exercises: Vec<PlannedExercise>,
    },
    Rm {
        id: SessionId,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ExerciseCmd {
    List,
    Add {
        name: String,
        #[arg(long, value_enum, ignore_case = true, default_value_t = ExerciseCategory::Other)]
        category: ExerciseCategory,
        #[arg(long)]
        description: Option<String>,
    },
    Rm {
        id: ExerciseId,
    },
}

/// What a command needs besides its arguments
pub struct Context<'a, C: Clock> {
    pub db: &'a Database,
    pub store: &'a mut WorkoutStore<C>,
    pub feedback: &'a mut FeedbackChain,
    pub record_history: bool,
}

pub fn run<C: Clock, W: Write>(command: Command, mut ctx: Context<'_, C>, out: &mut W) -> CmdResult {
    match command {
        Command::Program { action } => program(action, ctx.db, out),
        Command::Session { action } => session(action, ctx.db, out),
        Command::Exercise { action } => exercise(action, ctx.db, out),
        Command::Start { session_id } => start(session_id, ctx, out),
        Command::Pause => {
            if ctx.store.pause().applied() {
                ctx.feedback.signal(Cue::Pause);
            }
            status(ctx.store, out)
        }
        Command::Resume => {
            if ctx.store.resume().applied() {
                ctx.feedback.signal(Cue::Resume);
            }
            status(ctx.store, out)
        }
        Command::Status => status(ctx.store, out),
        Command::Finish => finish(ctx, out),
        Command::History { id: None, limit } => history(ctx.db, limit, out),
        Command::History { id: Some(id), .. } => workout_detail(ctx.db, id, out),
        Command::Export { path } => {
            let count = ctx.db.export_history_csv(File::create(&path)?)?;
            writeln!(out, "Exported {} to {}", plural(count, "workout"), path.display())?;
            Ok(())
        }
    }
}

fn program<W: Write>(action: ProgramCmd, db: &Database, out: &mut W) -> CmdResult {
    match action {
        ProgramCmd::List => {
            let programs = db.programs()?;
            if programs.is_empty() {
                writeln!(out, "No programs yet")?;
            }
            for p in programs {
                let sessions = db.sessions_by_program(p.id)?.len();
                writeln!(
                    out,
                    "{}\t{}\t{}\t{}",
                    p.id,
                    p.name,
                    plural(sessions, "session"),
                    p.description.unwrap_or_default()
                )?;
            }
        }
        ProgramCmd::Add { name, description } => {
            let id = db.create_program(&name, description.as_deref())?;
            writeln!(out, "Created program {id}")?;
        }
        ProgramCmd::Rename {
            id,
            name,
            description,
        } => {
            db.update_program(id, &name, description.as_deref())?;
            writeln!(out, "Updated program {id}")?;
        }
        ProgramCmd::Rm { id } => {
            if db.delete_program(id)? {
                writeln!(out, "Deleted program {id}")?;
            } else {
                writeln!(out, "No program {id}")?;
            }
        }
    }
    Ok(())
}

fn session<W: Write>(action: SessionCmd, db: &Database, out: &mut W) -> CmdResult {
    match action {
        SessionCmd::List {
            program,
            unassigned,
        } => {
            let sessions = match (program, unassigned) {
                (Some(id), _) => db.sessions_by_program(id)?,
                (None, true) => db.unassigned_sessions()?,
                (None, false) => db.sessions()?,
            };
            if sessions.is_empty() {
                writeln!(out, "No sessions")?;
            }
            for s in sessions {
                let minutes = s.duration.map(|d| format!("{d} min")).unwrap_or_default();
                writeln!(out, "{}\t{}\t{}\t{}", s.id, s.session_type, s.name, minutes)?;
            }
        }
        SessionCmd::Show { id } => {
            let Some(s) = db.session(id)? else {
                writeln!(out, "No session {id}")?;
                return Ok(());
            };
            writeln!(out, "{} [{}]", s.name, s.session_type)?;
            writeln!(out, "{}", s.session_type.description())?;
            writeln!(out, "Program: {}", program_label(db, s.program_id)?)?;
            if let Some(d) = s.duration {
                writeln!(out, "Duration: {d} minutes")?;
            }
            if let Some(when) = s.schedule_label() {
                writeln!(out, "Scheduled: {when}")?;
            }
            if let Some(every) = s.recurrence.label() {
                writeln!(out, "Repeats: {every}")?;
            }
            writeln!(out, "Exercises:")?;
            for (i, e) in db.session_exercises(id)?.iter().enumerate() {
                let plan = [
                    e.sets.map(|n| format!("{n} sets")),
                    e.reps.map(|n| format!("{n} reps")),
                    e.duration.map(|n| format!("{n}s")),
                    e.rest_time.map(|n| format!("{n}s rest")),
                ]
                .into_iter()
                .flatten()
                .join(", ");
                writeln!(out, "  {}. {}  {}", i + 1, e.exercise_name, plan)?;
            }
        }
        SessionCmd::Add {
            name,
            session_type,
            program,
            duration,
            date,
            time,
            recurrence,
            exercises,
        } => {
            let new = NewSession {
                program_id: program,
                name,
                session_type,
                scheduled_date: date,
                scheduled_time: time,
                recurrence,
                duration,
            };
            let id = db.create_session(&new, &exercises)?;
            writeln!(out, "Created session {id}")?;
        }
        SessionCmd::Edit {
            id,
            name,
            session_type,
            program,
            unassign,
            duration,
            date,
            time,
            recurrence,
            exercises,
        } => {
            let Some(s) = db.session(id)? else {
                writeln!(out, "No session {id}")?;
                return Ok(());
            };
            let updated = NewSession {
                program_id: if unassign { None } else { program.or(s.program_id) },
                name: name.unwrap_or(s.name),
                session_type: session_type.unwrap_or(s.session_type),
                scheduled_date: date.or(s.scheduled_date),
                scheduled_time: time.or(s.scheduled_time),
                recurrence: recurrence.unwrap_or(s.recurrence),
                duration: duration.or(s.duration),
            };
            if let Some(pid) = updated.program_id {
                if db.program(pid)?.is_none() {
                    writeln!(out, "No program {pid}")?;
                    return Ok(());
                }
            }
            db.update_session(id, &updated)?;
            if !exercises.is_empty() {
                db.replace_session_exercises(id, &exercises)?;
            }
            writeln!(out, "Updated session {id}")?;
        }
        SessionCmd::Rm { id } => {
            if db.delete_session(id)? {
                writeln!(out, "Deleted session {id}")?;
            } else {
                writeln!(out, "No session {id}")?;
            }
        }
    }
    Ok(())
}

fn exercise<W: Write>(action: ExerciseCmd, db: &Database, out: &mut W) -> CmdResult {
    match action {
        ExerciseCmd::List => {
            for e in db.exercises()? {
                let origin = if e.is_custom { "custom" } else { "built-in" };
                writeln!(out, "{}\t{}\t{}\t{}", e.id, e.name, e.category, origin)?;
            }
        }
        ExerciseCmd::Add {
            name,
            category,
            description,
        } => {
            let id = db.create_exercise(&name, category, description.as_deref())?;
            writeln!(out, "Created exercise {id}")?;
        }
        ExerciseCmd::Rm { id } => {
            if db.delete_exercise(id)? {
                writeln!(out, "Deleted exercise {id}")?;
            } else {
                writeln!(out, "Exercise {id} is not a custom exercise")?;
            }
        }
    }
    Ok(())
}

fn start<C: Clock, W: Write>(session_id: SessionId, mut ctx: Context<'_, C>, out: &mut W) -> CmdResult {
    let Some(s) = ctx.db.session(session_id)? else {
        writeln!(out, "No session {session_id}")?;
        return Ok(());
    };
    match ctx.store.start(s.id, &s.name, s.session_type) {
        StartOutcome::Started => writeln!(out, "Started {} [{}]", s.name, s.session_type)?,
        StartOutcome::AlreadyActive { session_id } => writeln!(
            out,
            "A workout is already in progress: {} (session {session_id})",
            ctx.store.state().session_name().unwrap_or_default()
        )?,
    }
    Ok(())
}

fn status<C: Clock, W: Write>(store: &WorkoutStore<C>, out: &mut W) -> CmdResult {
    let state = store.state();
    let label = match store.phase() {
        WorkoutPhase::Idle => {
            writeln!(out, "No active workout")?;
            return Ok(());
        }
        WorkoutPhase::Running => "running",
        WorkoutPhase::Paused => "paused",
    };
    writeln!(
        out,
        "{} [{}] {} {}",
        state.session_name().unwrap_or_default(),
        state.session_type().map(|t| t.as_str()).unwrap_or_default(),
        label,
        format_clock(store.elapsed_seconds())
    )?;
    Ok(())
}

/// Planned reps stand in for performed reps since the shell has no counter
fn finish<C: Clock, W: Write>(mut ctx: Context<'_, C>, out: &mut W) -> CmdResult {
    let state = ctx.store.state().clone();
    let Some(session_id) = state.active_session_id() else {
        writeln!(out, "No active workout")?;
        return Ok(());
    };

    let session = ctx.db.session(session_id)?;
    let exercises: Vec<WorkoutExercise> = ctx
        .db
        .session_exercises(session_id)?
        .iter()
        .map(WorkoutExercise::from_detail)
        .collect();
    let program_name = match &session {
        Some(s) => program_label(ctx.db, s.program_id)?,
        None => NO_PROGRAM_LABEL.to_string(),
    };
    let context = SummaryContext {
        session_id,
        session_name: state.session_name().unwrap_or_default().to_string(),
        session_type: state.session_type().unwrap_or(SessionType::Amrap),
        program_name,
    };
    let summary = WorkoutSummary::build(&context, ctx.store.elapsed_seconds(), &exercises);

    ctx.store.finish();
    ctx.feedback.signal(Cue::Finish);
    print_summary(&summary, out)?;

    if ctx.record_history && session.is_some() {
        ctx.db.record_workout(&summary)?;
    }
    Ok(())
}

fn print_summary<W: Write>(summary: &WorkoutSummary, out: &mut W) -> CmdResult {
    writeln!(out, "Workout complete: {} [{}]", summary.session_name, summary.session_type)?;
    writeln!(out, "Program: {}", summary.program_name)?;
    writeln!(out, "Time: {}", format_clock(summary.total_seconds))?;
    writeln!(out, "Total reps: {}", summary.total_reps)?;
    writeln!(out, "Exercises: {}", summary.exercise_count)?;
    for e in &summary.per_exercise {
        match e.planned_reps {
            Some(plan) => writeln!(out, "  {}: {} / {}", e.name, e.reps, plan)?,
            None => writeln!(out, "  {}: {}", e.name, e.reps)?,
        }
    }
    Ok(())
}

fn history<W: Write>(db: &Database, limit: usize, out: &mut W) -> CmdResult {
    let entries = db.recent_workouts(limit)?;
    if entries.is_empty() {
        writeln!(out, "No workouts recorded")?;
    }
    for e in entries {
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{} reps\t{}",
            e.id,
            e.completed_at,
            e.session_name,
            e.duration_label(),
            e.total_reps,
            e.completed_ago()
        )?;
    }
    Ok(())
}

fn workout_detail<W: Write>(db: &Database, id: i64, out: &mut W) -> CmdResult {
    let Some(e) = db.workout(id)? else {
        writeln!(out, "No workout {id}")?;
        return Ok(());
    };
    writeln!(out, "{} ({})", e.session_name, e.completed_ago())?;
    writeln!(out, "Completed: {}", e.completed_at)?;
    writeln!(out, "Time: {}", e.duration_label())?;
    writeln!(out, "Total reps: {}", e.total_reps)?;
    for (name, reps) in db.workout_exercise_reps(id)? {
        writeln!(out, "  {name}: {reps}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pushit::clock::ManualClock;

    const T0: i64 = 1_760_000_000_000;

    struct Harness {
        db: Database,
        store: WorkoutStore<ManualClock>,
        clock: ManualClock,
        feedback: FeedbackChain,
    }

    impl Harness {
        fn new() -> Self {
            let clock = ManualClock::new(T0);
            Self {
                db: Database::open_in_memory().unwrap(),
                store: WorkoutStore::new(clock.clone()),
                clock,
                feedback: FeedbackChain::muted(),
            }
        }

        fn run(&mut self, command: Command) -> String {
            let mut out = Vec::new();
            let ctx = Context {
                db: &self.db,
                store: &mut self.store,
                feedback: &mut self.feedback,
                record_history: true,
            };
            run(command, ctx, &mut out).unwrap();
            String::from_utf8(out).unwrap()
        }
    }

    fn add_session(h: &mut Harness, program: Option<ProgramId>) -> String {
        h.run(Command::Session {
            action: SessionCmd::Add {
                name: "Friday AMRAP".into(),
                session_type: SessionType::Amrap,
                program,
                duration: Some(20),
                date: None,
                time: None,
                recurrence: Recurrence::Weekly,
                exercises: vec!["Burpees:10".parse().unwrap(), "Plank".parse().unwrap()],
            },
        })
    }

    #[test]
    fn program_lifecycle() {
        let mut h = Harness::new();
        assert_eq!(h.run(Command::Program { action: ProgramCmd::List }), "No programs yet\n");
        assert_eq!(
            h.run(Command::Program {
                action: ProgramCmd::Add {
                    name: "Summer cut".into(),
                    description: None
                }
            }),
            "Created program 1\n"
        );
        add_session(&mut h, Some(1));
        let listing = h.run(Command::Program { action: ProgramCmd::List });
        assert_eq!(listing, "1\tSummer cut\t1 session\t\n");
        assert_eq!(
            h.run(Command::Program { action: ProgramCmd::Rm { id: 1 } }),
            "Deleted program 1\n"
        );
    }

    #[test]
    fn session_show_includes_plan() {
        let mut h = Harness::new();
        assert_eq!(add_session(&mut h, None), "Created session 1\n");
        let shown = h.run(Command::Session {
            action: SessionCmd::Show { id: 1 },
        });
        assert!(shown.starts_with("Friday AMRAP [AMRAP]\n"));
        assert!(shown.contains("Program: No program\n"));
        assert!(shown.contains("Duration: 20 minutes\n"));
        assert!(shown.contains("Repeats: Every week\n"));
        assert!(shown.contains("  1. Burpees  10 reps\n"));
        assert!(shown.contains("  2. Plank  \n"));
    }

    #[test]
    fn workout_commands_drive_the_store() {
        let mut h = Harness::new();
        add_session(&mut h, None);

        assert_eq!(h.run(Command::Status), "No active workout\n");
        assert_eq!(h.run(Command::Start { session_id: 1 }), "Started Friday AMRAP [AMRAP]\n");
        h.clock.advance(65_000);
        assert_eq!(h.run(Command::Pause), "Friday AMRAP [AMRAP] paused 01:05\n");
        h.clock.advance(120_000);
        assert_eq!(h.run(Command::Status), "Friday AMRAP [AMRAP] paused 01:05\n");
        assert_eq!(h.run(Command::Resume), "Friday AMRAP [AMRAP] running 01:05\n");
        h.clock.advance(10_000);

        let again = h.run(Command::Start { session_id: 1 });
        assert!(again.starts_with("A workout is already in progress"));

        let summary = h.run(Command::Finish);
        assert!(summary.contains("Time: 01:15\n"));
        assert!(summary.contains("Total reps: 10\n"));
        assert!(summary.contains("  Burpees: 10 / 10\n"));
        assert!(summary.contains("  Plank: 0\n"));
        assert_eq!(h.store.phase(), WorkoutPhase::Idle);

        let history = h.run(Command::History { id: None, limit: 5 });
        assert!(history.contains("\tFriday AMRAP\t01:15\t10 reps\t"));
        assert_eq!(h.run(Command::Finish), "No active workout\n");
    }

    #[test]
    fn session_edit_updates_fields_and_exercises() {
        let mut h = Harness::new();
        add_session(&mut h, None);
        let edit = |name: Option<&str>, exercises: Vec<PlannedExercise>| Command::Session {
            action: SessionCmd::Edit {
                id: 1,
                name: name.map(String::from),
                session_type: Some(SessionType::Emom),
                program: None,
                unassign: false,
                duration: None,
                date: None,
                time: None,
                recurrence: None,
                exercises,
            },
        };

        assert_eq!(h.run(edit(Some("Saturday EMOM"), vec![])), "Updated session 1\n");
        let shown = h.run(Command::Session {
            action: SessionCmd::Show { id: 1 },
        });
        assert!(shown.starts_with("Saturday EMOM [EMOM]\n"));
        // Untouched fields and the exercise list are kept
        assert!(shown.contains("Duration: 20 minutes\n"));
        assert!(shown.contains("Repeats: Every week\n"));
        assert!(shown.contains("  1. Burpees  10 reps\n"));

        h.run(edit(None, vec!["Squats:25:2".parse().unwrap()]));
        let shown = h.run(Command::Session {
            action: SessionCmd::Show { id: 1 },
        });
        assert!(shown.starts_with("Saturday EMOM [EMOM]\n"));
        assert!(shown.contains("  1. Squats  2 sets, 25 reps\n"));
        assert!(!shown.contains("Burpees"));

        let missing = Command::Session {
            action: SessionCmd::Edit {
                id: 42,
                name: None,
                session_type: None,
                program: None,
                unassign: false,
                duration: None,
                date: None,
                time: None,
                recurrence: None,
                exercises: vec![],
            },
        };
        assert_eq!(h.run(missing), "No session 42\n");
    }

    #[test]
    fn session_edit_moves_between_programs() {
        let mut h = Harness::new();
        h.run(Command::Program {
            action: ProgramCmd::Add {
                name: "Summer cut".into(),
                description: None,
            },
        });
        add_session(&mut h, Some(1));
        let edit = |program: Option<ProgramId>, unassign: bool| Command::Session {
            action: SessionCmd::Edit {
                id: 1,
                name: None,
                session_type: None,
                program,
                unassign,
                duration: None,
                date: None,
                time: None,
                recurrence: None,
                exercises: vec![],
            },
        };

        assert_eq!(h.run(edit(Some(9), false)), "No program 9\n");
        assert_eq!(h.db.session(1).unwrap().unwrap().program_id, Some(1));
        h.run(edit(None, true));
        assert_eq!(h.db.session(1).unwrap().unwrap().program_id, None);
    }

    #[test]
    fn history_shows_one_workout_with_reps() {
        let mut h = Harness::new();
        add_session(&mut h, None);
        h.run(Command::Start { session_id: 1 });
        h.clock.advance(42_000);
        h.run(Command::Finish);

        let listing = h.run(Command::History { id: None, limit: 5 });
        assert!(listing.starts_with("1\t"));
        let detail = h.run(Command::History { id: Some(1), limit: 10 });
        assert!(detail.starts_with("Friday AMRAP ("));
        assert!(detail.contains("Time: 00:42\n"));
        assert!(detail.contains("Total reps: 10\n"));
        assert!(detail.ends_with("  Burpees: 10\n  Plank: 0\n"));
        assert_eq!(h.run(Command::History { id: Some(7), limit: 10 }), "No workout 7\n");
    }

    #[test]
    fn finishing_a_deleted_session_skips_history() {
        let mut h = Harness::new();
        add_session(&mut h, None);
        h.run(Command::Start { session_id: 1 });
        h.run(Command::Session {
            action: SessionCmd::Rm { id: 1 },
        });

        let summary = h.run(Command::Finish);
        assert!(summary.starts_with("Workout complete: Friday AMRAP [AMRAP]\n"));
        assert!(summary.contains("Exercises: 0\n"));
        assert_eq!(h.run(Command::History { id: None, limit: 5 }), "No workouts recorded\n");
    }

    #[test]
    fn export_writes_csv() {
        let mut h = Harness::new();
        add_session(&mut h, None);
        h.run(Command::Start { session_id: 1 });
        h.clock.advance(30_000);
        h.run(Command::Finish);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.csv");
        let msg = h.run(Command::Export { path: path.clone() });
        assert!(msg.starts_with("Exported 1 workout to "));
        let csv = std::fs::read_to_string(&path).unwrap();
        assert!(csv.lines().nth(1).unwrap().contains(",Friday AMRAP,00:30,30,10"));
    }
}
