//! Terminal front-end for the candle chart.
//!
//! [`ChartView`] is the [`SeriesAdapter`](crate::series::SeriesAdapter) the
//! engine draws into; [`render`] turns it into a Ratatui frame.

pub mod app;
pub mod components;
pub mod event;
pub mod terminal;
pub mod ui;

pub use app::{App, ChartView};
pub use event::{Action, Event};
pub use terminal::{Tui, restore_terminal, setup_terminal};
pub use ui::render;
