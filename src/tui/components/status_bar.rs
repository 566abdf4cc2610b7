//! Status bar component.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::engine::Phase;
use crate::models::format_remaining;
use crate::tui::app::{App, ChartView};

/// Renders the status bar.
pub fn render(frame: &mut Frame, area: Rect, app: &App, view: &ChartView) {
    let phase_color = match app.phase {
        Phase::Streaming(_) => Color::Green,
        Phase::Loading(_) => Color::Yellow,
        Phase::Idle => Color::Red,
    };

    let countdown = view
        .live_remaining_ms()
        .map_or_else(|| "--:--".to_string(), format_remaining);

    let candles = format!(" {} candles ", view.points().len());

    let spans = vec![
        Span::styled(format!(" {} ", app.symbol), Style::default().fg(Color::Cyan)),
        Span::raw("│"),
        Span::styled(
            format!(" {} ", app.phase.label()),
            Style::default().fg(phase_color),
        ),
        Span::raw("│"),
        Span::raw(format!(" {} ", app.interval)),
        Span::raw("│"),
        Span::styled(
            format!(" close in {countdown} "),
            Style::default().fg(Color::White),
        ),
        Span::raw("│"),
        Span::raw(format!(
            "{:>width$}",
            candles,
            width = area.width.saturating_sub(45) as usize
        )),
    ];

    let para = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(para, area);
}
