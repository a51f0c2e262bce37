pub mod charting;
pub mod screen;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use pushit::{clock::Clock, feedback::Cue, workout::WorkoutPhase};

use crate::App;

const HORIZONTAL_MARGIN: u16 = 2;

pub fn draw<C: Clock>(app: &App<C>, f: &mut Frame) {
    let show_banner = app.shows_banner();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(if show_banner { 1 } else { 0 }), // active workout
            Constraint::Min(1),                                   // screen body
            Constraint::Length(1),                                // footer
        ])
        .split(f.area());

    if show_banner {
        render_banner(app, f, chunks[0]);
    }

    let body = Layout::default()
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([Constraint::Min(1)])
        .split(chunks[1])[0];
    let screen = screen::current_screen::<C>(&app.view);
    screen.render(app, f, body);

    render_footer(app, screen.hints(app), f, chunks[2]);
}

/// One line with the running workout, shown on every other screen
fn render_banner<C: Clock>(app: &App<C>, f: &mut Frame, area: Rect) {
    let state = app.store.state();
    let (marker, color) = match app.store.phase() {
        WorkoutPhase::Paused => ("⏸", Color::Yellow),
        _ => ("●", Color::Green),
    };
    let line = Line::from(vec![
        Span::styled(format!(" {marker} "), Style::default().fg(color)),
        Span::styled(
            state.session_name().unwrap_or_default().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" {} ", app.banner.label())),
        Span::styled("w: open workout", Style::default().add_modifier(Modifier::DIM)),
    ]);
    f.render_widget(
        Paragraph::new(line).style(Style::default().bg(Color::DarkGray)),
        area,
    );
}

fn render_footer<C: Clock>(app: &App<C>, hints: &str, f: &mut Frame, area: Rect) {
    let line = if let Some(message) = &app.message {
        Line::from(Span::styled(message.clone(), Style::default().fg(Color::Red)))
    } else if let Some(cue) = app.flash {
        Line::from(Span::styled(
            format!(" {} ", flash_text(cue)),
            Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD),
        ))
    } else {
        Line::from(Span::styled(
            hints.to_string(),
            Style::default().add_modifier(Modifier::DIM),
        ))
    };
    f.render_widget(Paragraph::new(line), area);
}

/// Visual stand-in for the bell when sound is off or unavailable
pub fn flash_text(cue: Cue) -> &'static str {
    match cue {
        Cue::Pause => "⏸ PAUSED",
        Cue::Resume => "▶ RESUMED",
        Cue::Finish => "■ FINISHED",
    }
}

/// Rectangle of `percent_x` by `height` centered in `area`
pub fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(height),
            Constraint::Fill(1),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_fits_inside() {
        let area = Rect::new(0, 0, 100, 30);
        let r = centered_rect(50, 5, area);
        assert_eq!(r.height, 5);
        assert_eq!(r.width, 50);
        assert!(r.x >= 20 && r.y >= 10);
    }

    #[test]
    fn test_flash_text() {
        assert!(flash_text(Cue::Pause).contains("PAUSED"));
        assert!(flash_text(Cue::Finish).contains("FINISHED"));
    }
}
