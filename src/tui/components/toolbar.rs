//! Interval and style selector bar.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::models::{ChartStyle, groups};
use crate::tui::app::App;

fn item_style(is_active: bool) -> Style {
    if is_active {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    }
}

/// Renders the grouped interval menu.
pub fn render_intervals(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans: Vec<Span> = Vec::new();

    for (i, group) in groups().iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("│"));
        }
        spans.push(Span::styled(
            format!(" {} ", group.label),
            Style::default().fg(Color::DarkGray),
        ));
        for interval in group.intervals {
            spans.push(Span::styled(
                format!(" {interval} "),
                item_style(*interval == app.interval),
            ));
        }
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Renders the chart style buttons.
pub fn render_styles(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans: Vec<Span> = vec![Span::styled(" Style ", Style::default().fg(Color::DarkGray))];

    for style in ChartStyle::ALL {
        spans.push(Span::styled(
            format!(" {style} "),
            item_style(style == app.style),
        ));
        spans.push(Span::raw(" "));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
