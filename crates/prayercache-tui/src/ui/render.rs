use prayercache_core::utils::wrapped_line_count;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, AppState, Notices};

use super::styles;

/// Width of the prayer name column
const NAME_WIDTH: usize = 10;

/// Rows the notice banner needs at this terminal width, borders included
fn notice_height(notices: &Notices, width: u16) -> u16 {
    if notices.is_empty() {
        return 0;
    }
    let inner = width.saturating_sub(2) as usize;
    let rows: usize = notices
        .iter()
        .map(|n| wrapped_line_count(&n.message, inner))
        .sum();
    u16::try_from(rows).unwrap_or(u16::MAX).saturating_add(2)
}

pub fn render(frame: &mut Frame, app: &App) {
    let notice_height = notice_height(&app.notices, frame.area().width);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),             // Title bar
            Constraint::Length(notice_height), // Notices
            Constraint::Length(3),             // Location and date
            Constraint::Min(8),                // Times
            Constraint::Length(2),             // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, chunks[0]);
    render_notices(frame, app, chunks[1]);
    render_heading(frame, app, chunks[2]);
    render_times(frame, app, chunks[3]);
    render_status_bar(frame, app, chunks[4]);

    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame);
    }
}

fn render_title_bar(frame: &mut Frame, area: Rect) {
    let title = "  Prayer Times";
    let help_hint = "[?] Help";

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            area.width
                .saturating_sub(title.len() as u16 + help_hint.len() as u16 + 4)
                as usize,
        )),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_notices(frame: &mut Frame, app: &App, area: Rect) {
    if area.height == 0 {
        return;
    }
    let lines: Vec<Line> = app
        .notices
        .iter()
        .map(|n| Line::from(Span::styled(n.message.as_str(), styles::notice_style())))
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::notice_style())
        .title(" [Esc] dismiss ");

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

fn render_heading(frame: &mut Frame, app: &App, area: Rect) {
    let date_line = app
        .view
        .as_ref()
        .map(|v| v.date_line())
        .unwrap_or_default();

    let lines = vec![
        Line::from(Span::styled(app.location.display(), styles::muted_style())),
        Line::from(Span::styled(date_line, styles::highlight_style())),
    ];

    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        area,
    );
}

fn render_times(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style())
        .title(" Today ");

    let mut lines: Vec<Line> = match app.view {
        Some(ref view) => view
            .times
            .iter()
            .map(|(prayer, time)| {
                Line::from(vec![
                    Span::styled(
                        format!("{:<width$}", prayer.name(), width = NAME_WIDTH),
                        styles::prayer_name_style(),
                    ),
                    Span::styled(format!("{:>8}", time), styles::time_style()),
                ])
            })
            .collect(),
        None if app.is_loading() => vec![Line::from(Span::styled(
            "Loading...",
            styles::muted_style(),
        ))],
        None => vec![Line::from(Span::styled(
            "No prayer times available. Press [r] to try again.",
            styles::muted_style(),
        ))],
    };

    lines.push(Line::from(""));
    let updated_style = match app.view {
        Some(ref view) if !view.provenance.is_cached() && app.status_message.is_none() => {
            styles::success_style()
        }
        _ => styles::muted_style(),
    };
    lines.push(Line::from(Span::styled(app.last_updated_line(), updated_style)));

    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        area,
    );
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = "[r]efresh | [q]uit";

    let left_text = if app.is_loading() {
        " Working... ".to_string()
    } else {
        String::new()
    };
    let right_text = format!(" {} ", shortcuts);

    let width = area.width as usize;
    let padding_len = width
        .saturating_sub(left_text.len())
        .saturating_sub(right_text.len());
    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);

    frame.render_widget(
        Paragraph::new(status_line).style(styles::status_bar_style()),
        area,
    );
}

fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(44, 12, frame.area());
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");
    let key = |k: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<10}", k), styles::help_key_style()),
            Span::styled(desc, styles::help_desc_style()),
        ])
    };

    let help_text = vec![
        Line::from(Span::styled(
            format!("  prayercache {}", version),
            styles::title_style(),
        )),
        Line::from(""),
        key("r", "Refresh from the network"),
        key("Esc", "Dismiss messages"),
        key("?", "Toggle this help"),
        key("q", "Quit"),
        Line::from(""),
        Line::from(Span::styled(
            "  Times are cached for offline use.",
            styles::muted_style(),
        )),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style())
        .title(" Help ");

    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use prayercache_core::location::LocationError;
    use prayercache_core::prayer::Notice;
    use std::time::Instant;

    #[test]
    fn test_notice_height_fits_wrapped_messages() {
        let mut notices = Notices::default();
        assert_eq!(notice_height(&notices, 80), 0);

        notices.push(Notice::new("offline"), Instant::now());
        assert_eq!(notice_height(&notices, 80), 3);

        // The denied-location notice does not fit on one 80 column row
        let denied = format!(
            "{} Displaying cached data if available.",
            LocationError::PermissionDenied
        );
        notices.push(Notice::new(denied), Instant::now());
        assert_eq!(notice_height(&notices, 80), 5);
        assert_eq!(notice_height(&notices, 200), 4);
    }
}
