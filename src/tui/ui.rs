//! Main UI rendering coordinator.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use super::app::{App, ChartView, PriceMarker};
use super::components::{status_bar, toolbar};
use crate::models::{ChartStyle, DisplayStats};
use crate::series::{SeriesPoint, Trend};

/// Width of the price axis gutter, including the separator.
const AXIS_WIDTH: usize = 12;

const UP_COLOR: Color = Color::Green;
const DOWN_COLOR: Color = Color::Red;
const VALUE_COLOR: Color = Color::LightBlue;

/// Renders the entire application UI.
pub fn render(frame: &mut Frame, app: &App, view: &ChartView) {
    let area = frame.area();

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Interval menu
            Constraint::Length(1), // Style buttons
            Constraint::Length(1), // Stats header
            Constraint::Min(5),    // Chart
            Constraint::Length(1), // Status bar
            Constraint::Length(1), // Keybindings help
        ])
        .split(area);

    toolbar::render_intervals(frame, main_layout[0], app);
    toolbar::render_styles(frame, main_layout[1], app);
    render_stats_header(frame, main_layout[2], view.stats());
    render_chart(frame, main_layout[3], app, view);
    status_bar::render(frame, main_layout[4], app, view);
    render_keybindings(frame, main_layout[5]);
}

fn trend_color(trend: Trend) -> Color {
    match trend {
        Trend::Up => UP_COLOR,
        Trend::Down => DOWN_COLOR,
    }
}

/// Renders the OHLC / change header for the current candle.
fn render_stats_header(frame: &mut Frame, area: Rect, stats: Option<&DisplayStats>) {
    let Some(stats) = stats else {
        let para =
            Paragraph::new(" Waiting for data...").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(para, area);
        return;
    };

    let change_color = if stats.is_up { UP_COLOR } else { DOWN_COLOR };
    let line = Line::from(vec![
        Span::raw(format!(
            " O {:.2}  H {:.2}  L {:.2}  C ",
            stats.open, stats.high, stats.low
        )),
        Span::styled(
            format!("{:.2}", stats.close),
            Style::default()
                .fg(change_color)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {:+.2} ({:+.2}%)", stats.change, stats.percent),
            Style::default().fg(change_color),
        ),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

fn render_chart(frame: &mut Frame, area: Rect, app: &App, view: &ChartView) {
    let title = format!(" {} {} [{}] ", app.symbol, app.interval, view.style());
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if view.points().is_empty() {
        let para = Paragraph::new("No candle data").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(para, inner);
        return;
    }

    let lines = chart_lines(
        view.points(),
        view.style(),
        view.marker(),
        inner.width as usize,
        inner.height as usize,
    );
    frame.render_widget(Paragraph::new(lines), inner);
}

/// Builds the ASCII chart: one row per price band, one column per point,
/// newest point on the right.
pub fn chart_lines(
    points: &[SeriesPoint],
    style: ChartStyle,
    marker: Option<&PriceMarker>,
    width: usize,
    height: usize,
) -> Vec<Line<'static>> {
    let columns = width.saturating_sub(AXIS_WIDTH);
    if points.is_empty() || columns == 0 || height == 0 {
        return Vec::new();
    }

    let visible = &points[points.len().saturating_sub(columns)..];

    // Find price range
    let (mut min_price, mut max_price) = visible
        .iter()
        .fold((Decimal::MAX, Decimal::MIN), |(min, max), p| {
            (min.min(p.low()), max.max(p.high()))
        });
    if let Some(marker) = marker {
        min_price = min_price.min(marker.price);
        max_price = max_price.max(marker.price);
    }
    let price_range = if max_price > min_price {
        max_price - min_price
    } else {
        Decimal::ONE
    };
    let step = price_range / Decimal::from(height);
    let marker_row = marker.map(|m| row_of(m.price, max_price, step, height));

    let mut lines = Vec::with_capacity(height);
    for row in 0..height {
        let top = max_price - step * Decimal::from(row);
        let bottom = top - step;

        let mut spans: Vec<Span<'static>> = Vec::with_capacity(visible.len() + 1);
        spans.push(Span::raw(format!("{:>10.2} │", top)));

        let is_marker_row = marker_row == Some(row);
        for point in visible {
            let (glyph, color) = cell(point, style, top, bottom);
            if glyph == " " && is_marker_row {
                spans.push(marker_span(marker));
            } else {
                spans.push(Span::styled(glyph, Style::default().fg(color)));
            }
        }

        if is_marker_row && let Some(marker) = marker {
            spans.push(Span::styled(
                format!(" {}", marker.label),
                Style::default()
                    .fg(Color::Black)
                    .bg(trend_color(marker.trend)),
            ));
        }

        lines.push(Line::from(spans));
    }

    lines
}

/// Row index whose band contains `price`.
fn row_of(price: Decimal, max_price: Decimal, step: Decimal, height: usize) -> usize {
    if step.is_zero() {
        return 0;
    }
    ((max_price - price) / step)
        .floor()
        .to_usize()
        .unwrap_or(0)
        .min(height.saturating_sub(1))
}

fn marker_span(marker: Option<&PriceMarker>) -> Span<'static> {
    let color = marker.map_or(Color::DarkGray, |m| trend_color(m.trend));
    Span::styled("┄", Style::default().fg(color))
}

/// Glyph for one point within the band `[bottom, top]`.
fn cell(
    point: &SeriesPoint,
    style: ChartStyle,
    top: Decimal,
    bottom: Decimal,
) -> (&'static str, Color) {
    match *point {
        SeriesPoint::Ohlc {
            open,
            high,
            low,
            close,
            trend,
            ..
        } => {
            let color = trend_color(trend);
            if high < bottom || low > top {
                return (" ", color);
            }
            let body_top = open.max(close);
            let body_bottom = open.min(close);
            let in_body = body_top >= bottom && body_bottom <= top;

            let glyph = match style {
                ChartStyle::Bar if close >= bottom && close <= top => "├",
                ChartStyle::Bar if open >= bottom && open <= top => "┤",
                ChartStyle::Bar => "│",
                _ if in_body => "█",
                _ => "│",
            };
            (glyph, color)
        }
        SeriesPoint::Value { value, .. } => {
            let glyph = match style {
                ChartStyle::Area if value >= bottom => {
                    if value <= top {
                        "▄"
                    } else {
                        "█"
                    }
                }
                ChartStyle::Area => " ",
                _ if value >= bottom && value <= top => "•",
                _ => " ",
            };
            (glyph, VALUE_COLOR)
        }
    }
}

/// Renders the keybindings help line.
fn render_keybindings(frame: &mut Frame, area: Rect) {
    let help = "[/] or ←/→ interval  [c]andle [l]ine [a]rea [b]ar  [Tab] next style  [q]uit";

    let para = Paragraph::new(help).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(para, area);
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn value(time: i64, value: Decimal) -> SeriesPoint {
        SeriesPoint::Value { time, value }
    }

    #[test]
    fn empty_points_render_nothing() {
        assert!(chart_lines(&[], ChartStyle::Line, None, 80, 10).is_empty());
    }

    #[test]
    fn one_row_per_band() {
        let points = [value(60, dec!(100)), value(120, dec!(110))];
        let lines = chart_lines(&points, ChartStyle::Line, None, 40, 8);
        assert_eq!(lines.len(), 8);
        // axis label + one column per point
        assert!(lines.iter().all(|l| l.spans.len() == 3));
    }

    #[test]
    fn only_latest_points_fit() {
        let points: Vec<SeriesPoint> =
            (1..=50).map(|i| value(i * 60, Decimal::from(i))).collect();
        let lines = chart_lines(&points, ChartStyle::Area, None, AXIS_WIDTH + 10, 4);
        assert!(lines.iter().all(|l| l.spans.len() == 11));
    }

    #[test]
    fn marker_label_drawn_once() {
        let points = [value(60, dec!(100)), value(120, dec!(110))];
        let marker = PriceMarker {
            price: dec!(110),
            trend: Trend::Up,
            label: "110.00 | 00:42".to_string(),
        };
        let lines = chart_lines(&points, ChartStyle::Line, Some(&marker), 40, 6);
        let labelled = lines
            .iter()
            .filter(|l| line_text(l).contains("110.00 | 00:42"))
            .count();
        assert_eq!(labelled, 1);
        assert!(line_text(&lines[0]).contains("110.00 | 00:42"));
    }

    #[test]
    fn candle_body_and_wick_glyphs() {
        let point = SeriesPoint::Ohlc {
            time: 60,
            open: dec!(10),
            high: dec!(20),
            low: dec!(0),
            close: dec!(15),
            trend: Trend::Up,
        };
        assert_eq!(cell(&point, ChartStyle::Candlestick, dec!(13), dec!(11)).0, "█");
        assert_eq!(cell(&point, ChartStyle::Candlestick, dec!(19), dec!(17)).0, "│");
        assert_eq!(cell(&point, ChartStyle::Candlestick, dec!(30), dec!(25)).0, " ");
        assert_eq!(cell(&point, ChartStyle::Bar, dec!(16), dec!(14)).0, "├");
        assert_eq!(cell(&point, ChartStyle::Bar, dec!(11), dec!(9)).0, "┤");
    }

    #[test]
    fn row_of_clamps_to_last_row() {
        assert_eq!(row_of(dec!(110), dec!(110), dec!(2), 5), 0);
        assert_eq!(row_of(dec!(105), dec!(110), dec!(2), 5), 2);
        assert_eq!(row_of(dec!(100), dec!(110), dec!(2), 5), 4);
    }
}
