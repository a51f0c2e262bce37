use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use pushit::{
    clock::Clock,
    elapsed::format_clock,
    util::{plural, truncate},
    workout::WorkoutPhase,
    workout_screen::{ScreenView, WorkoutScreen},
};

use crate::{
    ui::{centered_rect, charting},
    App, View,
};

const NAME_COLUMN_WIDTH: usize = 32;

/// A UI Screen boundary: responsible for rendering one kind of view
pub trait Screen<C: Clock> {
    fn render(&self, app: &App<C>, f: &mut Frame, area: Rect);
    /// Key help shown in the footer
    fn hints(&self, _app: &App<C>) -> &'static str {
        "↑↓ select · enter open · h history · esc back · q quit"
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

fn title_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(format!(" {title} "), bold().fg(Color::Cyan)))
}

fn render_list(f: &mut Frame, area: Rect, title: &str, items: Vec<ListItem>, selected: usize) {
    let list = List::new(items)
        .block(title_block(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("› ");
    let mut state = ListState::default().with_selected(Some(selected));
    f.render_stateful_widget(list, area, &mut state);
}

/// Programs, plus entries for unassigned sessions and history
pub struct ProgramsScreen;

impl<C: Clock> Screen<C> for ProgramsScreen {
    fn render(&self, app: &App<C>, f: &mut Frame, area: Rect) {
        let View::Programs { programs, selected } = &app.view else {
            return;
        };
        let mut items: Vec<ListItem> = programs
            .iter()
            .map(|p| {
                let description = p.description.as_deref().unwrap_or_default();
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{:<width$}", truncate(&p.name, NAME_COLUMN_WIDTH), width = NAME_COLUMN_WIDTH), bold()),
                    Span::styled(truncate(description, 40), dim()),
                ]))
            })
            .collect();
        items.push(ListItem::new(Span::styled("Unassigned sessions", Style::default().fg(Color::Yellow))));
        items.push(ListItem::new(Span::styled("History", Style::default().fg(Color::Magenta))));
        render_list(f, area, "Programs", items, *selected);
    }
}

/// Sessions of one program, or the unassigned ones
pub struct SessionsScreen;

impl<C: Clock> Screen<C> for SessionsScreen {
    fn render(&self, app: &App<C>, f: &mut Frame, area: Rect) {
        let View::Sessions {
            title,
            sessions,
            selected,
        } = &app.view
        else {
            return;
        };
        if sessions.is_empty() {
            f.render_widget(
                Paragraph::new(Span::styled("No sessions yet. Add one with `pushit session add`.", dim()))
                    .block(title_block(title)),
                area,
            );
            return;
        }
        let items: Vec<ListItem> = sessions
            .iter()
            .map(|s| {
                let mut spans = vec![
                    Span::styled(format!("{:<6}", s.session_type.as_str()), Style::default().fg(Color::Cyan)),
                    Span::styled(format!("{:<width$}", truncate(&s.name, NAME_COLUMN_WIDTH), width = NAME_COLUMN_WIDTH), bold()),
                ];
                if let Some(d) = s.duration {
                    spans.push(Span::raw(format!("{d:>3} min  ")));
                }
                if let Some(when) = s.schedule_label() {
                    spans.push(Span::styled(when, dim()));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();
        render_list(f, area, title, items, *selected);
    }
}

pub struct SessionDetailScreen;

impl<C: Clock> Screen<C> for SessionDetailScreen {
    fn render(&self, app: &App<C>, f: &mut Frame, area: Rect) {
        let View::SessionDetail {
            session,
            program,
            exercises,
        } = &app.view
        else {
            return;
        };
        let Some(session) = session else {
            f.render_widget(
                Paragraph::new("Session not found").block(title_block("Session")),
                area,
            );
            return;
        };

        let mut lines = vec![
            Line::from(vec![
                Span::styled(session.session_type.as_str(), bold().fg(Color::Cyan)),
                Span::raw("  "),
                Span::styled(session.session_type.description(), dim()),
            ]),
            Line::from(format!("Program: {program}")),
        ];
        if let Some(d) = session.duration {
            lines.push(Line::from(format!("Duration: {d} minutes")));
        }
        if let Some(when) = session.schedule_label() {
            lines.push(Line::from(format!("Scheduled: {when}")));
        }
        if let Some(every) = session.recurrence.label() {
            lines.push(Line::from(format!("Repeats: {every}")));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(plural(exercises.len(), "exercise"), bold())));
        for (i, e) in exercises.iter().enumerate() {
            let mut plan = Vec::new();
            if let Some(sets) = e.sets {
                plan.push(format!("{sets} sets"));
            }
            if let Some(reps) = e.reps {
                plan.push(format!("{reps} reps"));
            }
            if let Some(secs) = e.duration {
                plan.push(format!("{secs}s"));
            }
            if let Some(rest) = e.rest_time {
                plan.push(format!("{rest}s rest"));
            }
            lines.push(Line::from(vec![
                Span::raw(format!("{:>2}. ", i + 1)),
                Span::raw(format!("{:<width$}", e.exercise_name, width = NAME_COLUMN_WIDTH)),
                Span::styled(plan.join(" · "), dim()),
                Span::styled(format!("  {}", e.exercise_category), Style::default().fg(Color::DarkGray)),
            ]));
        }

        f.render_widget(
            Paragraph::new(lines)
                .block(title_block(&session.name))
                .wrap(Wrap { trim: false }),
            area,
        );
    }

    fn hints(&self, _app: &App<C>) -> &'static str {
        "s start workout · w active workout · esc back · q quit"
    }
}

pub struct WorkoutView;

impl WorkoutView {
    fn render_active<C: Clock>(app: &App<C>, screen: &WorkoutScreen, f: &mut Frame, area: Rect) {
        let Some(context) = screen.context() else {
            return;
        };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // session + program
                Constraint::Length(3), // timer
                Constraint::Min(3),    // exercises
                Constraint::Length(1), // total reps
            ])
            .split(area);

        let mut header = vec![
            Span::styled(context.session_name.clone(), bold()),
            Span::raw("  "),
            Span::styled(context.session_type.as_str(), Style::default().fg(Color::Cyan)),
            Span::styled(format!("  {}", context.program_name), dim()),
        ];
        if let Some(minutes) = screen.planned_minutes() {
            header.push(Span::styled(format!("  · {minutes} min planned"), dim()));
        }
        f.render_widget(Paragraph::new(Line::from(header)), chunks[0]);

        let paused = app.store.phase() == WorkoutPhase::Paused;
        let timer_style = if paused {
            bold().fg(Color::Yellow)
        } else {
            bold().fg(Color::Green)
        };
        let mut timer = vec![Line::from(Span::styled(screen.elapsed_label(), timer_style))];
        if paused {
            timer.push(Line::from(Span::styled(
                "PAUSED",
                bold().fg(Color::Yellow).add_modifier(Modifier::SLOW_BLINK),
            )));
        }
        f.render_widget(Paragraph::new(timer).alignment(Alignment::Center), chunks[1]);

        let rows: Vec<Row> = screen
            .exercises()
            .iter()
            .enumerate()
            .map(|(i, e)| {
                let is_selected = i == screen.selected();
                let reps = match (is_selected, screen.reps_input()) {
                    (true, Some(input)) => format!("{input}_"),
                    _ => e.reps.to_string(),
                };
                Row::new(vec![
                    Cell::from(truncate(&e.name, NAME_COLUMN_WIDTH)),
                    Cell::from(reps),
                    Cell::from(e.planned_reps.map(|p| format!("/ {p}")).unwrap_or_default()),
                ])
            })
            .collect();
        let table = Table::new(
            rows,
            [
                Constraint::Length(NAME_COLUMN_WIDTH as u16 + 2),
                Constraint::Length(8),
                Constraint::Length(8),
            ],
        )
        .header(Row::new(vec!["Exercise", "Reps", "Plan"]).style(bold().fg(Color::Yellow)))
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .block(title_block("Exercises"));
        // Stateful so the selected row is scrolled into view
        let mut state = TableState::default().with_selected(Some(screen.selected()));
        f.render_stateful_widget(table, chunks[2], &mut state);

        f.render_widget(
            Paragraph::new(Line::from(vec![
                Span::raw("Total reps: "),
                Span::styled(screen.total_reps().to_string(), bold()),
            ])),
            chunks[3],
        );
    }

    fn render_confirm(f: &mut Frame, area: Rect) {
        let popup = centered_rect(50, 5, area);
        f.render_widget(Clear, popup);
        f.render_widget(
            Paragraph::new(vec![
                Line::from(Span::styled("Finish workout?", bold())),
                Line::from(""),
                Line::from("y: finish · n: keep going"),
            ])
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL)),
            popup,
        );
    }

    fn render_summary(screen: &WorkoutScreen, f: &mut Frame, area: Rect) {
        let Some(summary) = screen.summary() else {
            return;
        };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(7), Constraint::Min(5)])
            .split(area);

        let stats = vec![
            Line::from(vec![
                Span::styled(summary.session_name.clone(), bold()),
                Span::raw("  "),
                Span::styled(summary.session_type.as_str(), Style::default().fg(Color::Cyan)),
            ]),
            Line::from(format!("Program: {}", summary.program_name)),
            Line::from(vec![
                Span::raw("Time: "),
                Span::styled(format_clock(summary.total_seconds), bold().fg(Color::Green)),
            ]),
            Line::from(vec![
                Span::raw("Total reps: "),
                Span::styled(summary.total_reps.to_string(), bold()),
            ]),
            Line::from(format!("Exercises: {}", summary.exercise_count)),
        ];
        f.render_widget(
            Paragraph::new(stats).block(title_block("Workout complete")),
            chunks[0],
        );

        let bars = charting::reps_bars(&summary.per_exercise);
        let mut chart = BarChart::default()
            .block(title_block("Reps vs plan"))
            .bar_width(4)
            .bar_gap(1)
            .group_gap(3)
            .max(charting::chart_max(&summary.per_exercise));
        for group in &bars {
            let mut items = vec![Bar::default()
                .value(group.done)
                .style(Style::default().fg(Color::Green))];
            if let Some(plan) = group.planned {
                items.push(Bar::default().value(plan).style(Style::default().fg(Color::DarkGray)));
            }
            chart = chart.data(
                BarGroup::default()
                    .label(Line::from(group.label.clone()))
                    .bars(&items),
            );
        }
        f.render_widget(chart, chunks[1]);
    }
}

impl<C: Clock> Screen<C> for WorkoutView {
    fn render(&self, app: &App<C>, f: &mut Frame, area: Rect) {
        let View::Workout(screen) = &app.view else {
            return;
        };
        match screen.view() {
            ScreenView::Loading => {
                f.render_widget(
                    Paragraph::new(Span::styled("Loading session…", dim()))
                        .alignment(Alignment::Center)
                        .block(title_block("Workout")),
                    area,
                );
            }
            ScreenView::Conflict { active_name, .. } => {
                f.render_widget(
                    Paragraph::new(vec![
                        Line::from(Span::styled("Another workout is in progress", bold().fg(Color::Yellow))),
                        Line::from(""),
                        Line::from(format!("{active_name}  {}", app.banner.label())),
                        Line::from(""),
                        Line::from("Finish it before starting a new one."),
                    ])
                    .alignment(Alignment::Center)
                    .block(title_block("Workout")),
                    area,
                );
            }
            ScreenView::Active => Self::render_active(app, screen, f, area),
            ScreenView::ConfirmFinish => {
                Self::render_active(app, screen, f, area);
                Self::render_confirm(f, area);
            }
            ScreenView::Summary(_) => Self::render_summary(screen, f, area),
        }
    }

    fn hints(&self, app: &App<C>) -> &'static str {
        let View::Workout(screen) = &app.view else {
            return "";
        };
        match screen.view() {
            ScreenView::Loading => "esc back",
            ScreenView::Conflict { .. } => "w open active workout · esc back",
            ScreenView::Active => "space pause/resume · ↑↓ select · +/- reps · 0-9 type reps · f finish · esc back",
            ScreenView::ConfirmFinish => "y finish · n keep going",
            ScreenView::Summary(_) => "enter close",
        }
    }
}

pub struct HistoryScreen;

impl<C: Clock> Screen<C> for HistoryScreen {
    fn render(&self, app: &App<C>, f: &mut Frame, area: Rect) {
        let View::History { entries, selected } = &app.view else {
            return;
        };
        if entries.is_empty() {
            f.render_widget(
                Paragraph::new(Span::styled("No workouts recorded yet", dim())).block(title_block("History")),
                area,
            );
            return;
        }
        let rows: Vec<Row> = entries
            .iter()
            .enumerate()
            .map(|(i, e)| {
                let style = if i == *selected {
                    Style::default().add_modifier(Modifier::REVERSED)
                } else {
                    Style::default()
                };
                Row::new(vec![
                    Cell::from(e.completed_ago()),
                    Cell::from(truncate(&e.session_name, NAME_COLUMN_WIDTH)),
                    Cell::from(e.duration_label()),
                    Cell::from(e.total_reps.to_string()),
                ])
                .style(style)
            })
            .collect();
        let table = Table::new(
            rows,
            [
                Constraint::Length(20),
                Constraint::Length(NAME_COLUMN_WIDTH as u16 + 2),
                Constraint::Length(8),
                Constraint::Length(6),
            ],
        )
        .header(Row::new(vec!["When", "Session", "Time", "Reps"]).style(bold().fg(Color::Yellow)))
        .block(title_block("History"));
        f.render_widget(table, area);
    }

    fn hints(&self, _app: &App<C>) -> &'static str {
        "↑↓ scroll · esc back · q quit"
    }
}

/// Helper to construct the appropriate screen for the current view
pub fn current_screen<C: Clock>(view: &View) -> Box<dyn Screen<C>> {
    match view {
        View::Programs { .. } => Box::new(ProgramsScreen),
        View::Sessions { .. } => Box::new(SessionsScreen),
        View::SessionDetail { .. } => Box::new(SessionDetailScreen),
        View::Workout(_) => Box::new(WorkoutView),
        View::History { .. } => Box::new(HistoryScreen),
    }
}
