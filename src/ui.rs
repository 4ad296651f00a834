use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use std::time::Instant;
use unicode_width::UnicodeWidthStr;
use wfhtrack::{cue::Cue, session::format_amount};

use crate::App;

const HORIZONTAL_MARGIN: u16 = 2;
const VERTICAL_MARGIN: u16 = 1;
const INPUT_WIDTH: usize = 16;
const COIN: &str = "●";

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let session = &self.session;
        let symbol = self.currency_symbol.as_str();

        // styles
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
        let red_bold_style = Style::default().patch(bold_style).fg(Color::Red);
        let title_style = Style::default().patch(bold_style).fg(Color::Cyan);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(2), // title
                Constraint::Length(4), // inputs
                Constraint::Min(5),    // earnings
                Constraint::Length(1), // status
                Constraint::Length(1), // key hints
            ])
            .split(area);

        Paragraph::new(vec![
            Line::from(Span::styled("Work From Home Tracker", title_style)),
            Line::from(Span::styled(
                "watch your income grow while you work",
                italic_style,
            )),
        ])
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

        // inputs
        let salary = session.salary_input();
        let padding = INPUT_WIDTH.saturating_sub(salary.width());
        let rate = session.rate();
        let rate_line = if rate > 0.0 {
            Line::from(vec![
                Span::styled("Rate     ", dim_style),
                Span::raw(format!("{}/s", format_amount(rate, symbol))),
                Span::styled("  ·  ", dim_style),
                Span::raw(format!("{}/h", format_amount(rate * 3600.0, symbol))),
            ])
        } else {
            Line::from(Span::styled(
                "enter a salary to start earning",
                dim_style.add_modifier(Modifier::ITALIC),
            ))
        };

        Paragraph::new(vec![
            Line::from(vec![
                Span::styled("Salary   ", dim_style),
                Span::styled(
                    format!("[ {}▏{} ]", salary, " ".repeat(padding)),
                    bold_style,
                ),
            ]),
            Line::from(vec![
                Span::styled("Period   ", dim_style),
                Span::styled(format!("< {} >", session.pay_period()), bold_style),
            ]),
            Line::default(),
            rate_line,
        ])
        .render(chunks[1], buf);

        // earnings
        let total = format_amount(session.total(), symbol);
        let earnings_area = centered_rows(chunks[2], 3);
        Paragraph::new(vec![
            Line::from("Current earnings today"),
            Line::default(),
            Line::from(Span::styled(total, green_bold_style)),
        ])
        .alignment(Alignment::Center)
        .render(earnings_area, buf);

        // status
        let running = if session.is_running() {
            Span::styled("▶ WORKING", green_bold_style)
        } else {
            Span::styled("⏸ STOPPED", red_bold_style)
        };
        let animation = if session.feedback_enabled() {
            Span::styled("coins on", Style::default().fg(Color::Yellow))
        } else {
            Span::styled("coins off", dim_style)
        };
        Paragraph::new(Line::from(vec![running, Span::raw("   "), animation]))
            .alignment(Alignment::Center)
            .render(chunks[3], buf);

        // key hints, start dimmed while there is nothing to earn
        let start_style = if session.can_start() || session.is_running() {
            Style::default().fg(Color::Green)
        } else {
            dim_style
        };
        let start_label = if session.is_running() {
            "space stop"
        } else {
            "space start"
        };
        Paragraph::new(Line::from(vec![
            Span::styled(start_label, start_style),
            Span::styled(" / (r)eset / (a)nimation / (tab) period / (q)uit", dim_style),
        ]))
        .alignment(Alignment::Center)
        .render(chunks[4], buf);

        if session.feedback_enabled() {
            render_coins(session.cues(), session.now(), area, buf);
        }
    }
}

fn centered_rows(area: Rect, rows: u16) -> Rect {
    let rows = rows.min(area.height);
    Rect {
        y: area.y + (area.height - rows) / 2,
        height: rows,
        ..area
    }
}

/// Draw falling coins over everything else
fn render_coins<'a>(
    cues: impl Iterator<Item = &'a Cue>,
    now: Instant,
    area: Rect,
    buf: &mut Buffer,
) {
    let floor = area.height.saturating_sub(2) as f64;

    for frame in cues.filter_map(|cue| cue.frame(now, floor)) {
        if frame.x < 0.0 || frame.y < 0.0 {
            continue;
        }
        let x = frame.x as u16;
        let y = frame.y as u16;

        if x < area.width && y < area.height {
            let style = if frame.opacity > 0.7 {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else if frame.opacity > 0.3 {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::DIM)
            };

            if let Some(cell) = buf.cell_mut((area.x + x, area.y + y)) {
                cell.set_symbol(COIN);
                cell.set_style(style);
            }
        }
    }
}
