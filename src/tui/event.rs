//! Event handling for the TUI.

use std::time::Duration;

use crossterm::event::{
    self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
};
use tokio::sync::mpsc;

use super::app::App;
use crate::engine::Command;
use crate::models::ChartStyle;

/// Events that can occur in the terminal.
#[derive(Debug)]
pub enum Event {
    /// A key was pressed.
    Key(KeyEvent),
    /// Terminal was resized.
    Resize(u16, u16),
    /// Periodic tick for UI updates.
    Tick,
}

/// What the main loop should do in response to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Forward to the engine.
    Command(Command),
    Quit,
}

/// Spawns a task that polls for terminal events and sends them to a channel.
pub fn spawn_event_reader(tx: mpsc::UnboundedSender<Event>) {
    tokio::spawn(async move {
        loop {
            // Poll for events with a 50ms timeout
            match tokio::task::spawn_blocking(|| {
                if event::poll(Duration::from_millis(50)).unwrap_or(false) {
                    event::read().ok()
                } else {
                    None
                }
            })
            .await
            {
                Ok(Some(CrosstermEvent::Key(key))) => {
                    if tx.send(Event::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(Some(CrosstermEvent::Resize(w, h))) => {
                    if tx.send(Event::Resize(w, h)).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(_) => break,
            }
        }
    });
}

/// Spawns a task that sends periodic tick events.
pub fn spawn_tick_timer(tx: mpsc::UnboundedSender<Event>, interval_ms: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(interval_ms));
        loop {
            interval.tick().await;
            if tx.send(Event::Tick).is_err() {
                break;
            }
        }
    });
}

/// Updates application state based on a terminal event.
pub fn update(app: &mut App, event: Event) -> Option<Action> {
    match event {
        Event::Key(key) => {
            let action = handle_key(app, key);
            if action == Some(Action::Quit) {
                app.should_quit = true;
            }
            action
        }
        // Resize and tick only trigger a redraw.
        Event::Resize(_, _) | Event::Tick => None,
    }
}

/// Maps a key press to an action.
fn handle_key(app: &App, key: KeyEvent) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Action::Quit),
            _ => None,
        };
    }

    let command = match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return Some(Action::Quit),

        // Interval navigation
        KeyCode::Char(']') | KeyCode::Right => Command::SelectInterval(app.interval.next()),
        KeyCode::Char('[') | KeyCode::Left => Command::SelectInterval(app.interval.previous()),

        // Chart styles
        KeyCode::Char('c') => Command::SelectStyle(ChartStyle::Candlestick),
        KeyCode::Char('l') => Command::SelectStyle(ChartStyle::Line),
        KeyCode::Char('a') => Command::SelectStyle(ChartStyle::Area),
        KeyCode::Char('b') => Command::SelectStyle(ChartStyle::Bar),
        KeyCode::Tab => Command::SelectStyle(app.style.next()),

        _ => return None,
    };
    Some(Action::Command(command))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Interval;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn app() -> App {
        App::new("BTCUSDT", Interval::M1, ChartStyle::Candlestick)
    }

    #[test]
    fn brackets_step_through_intervals() {
        let mut app = app();
        assert_eq!(
            update(&mut app, key(KeyCode::Char(']'))),
            Some(Action::Command(Command::SelectInterval(Interval::M3)))
        );
        assert_eq!(
            update(&mut app, key(KeyCode::Left)),
            Some(Action::Command(Command::SelectInterval(Interval::S1)))
        );
    }

    #[test]
    fn style_keys() {
        let mut app = app();
        assert_eq!(
            update(&mut app, key(KeyCode::Char('a'))),
            Some(Action::Command(Command::SelectStyle(ChartStyle::Area)))
        );
        assert_eq!(
            update(&mut app, key(KeyCode::Tab)),
            Some(Action::Command(Command::SelectStyle(ChartStyle::Line)))
        );
    }

    #[test]
    fn quit_keys_set_flag() {
        for event in [
            key(KeyCode::Char('q')),
            key(KeyCode::Esc),
            Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
        ] {
            let mut app = app();
            assert_eq!(update(&mut app, event), Some(Action::Quit));
            assert!(app.should_quit);
        }
    }

    #[test]
    fn ticks_and_unknown_keys_do_nothing() {
        let mut app = app();
        assert_eq!(update(&mut app, Event::Tick), None);
        assert_eq!(update(&mut app, key(KeyCode::Char('z'))), None);
        let release = KeyEvent {
            kind: KeyEventKind::Release,
            ..KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)
        };
        assert_eq!(update(&mut app, Event::Key(release)), None);
        assert!(!app.should_quit);
    }
}
