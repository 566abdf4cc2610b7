use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::sync::{Arc, Mutex};

use candlesync::config::{AppConfig, fetch_config};
use candlesync::engine::{self, Command, Engine, EngineEvent};
use candlesync::fault::{FaultReporter, TracingReporter};
use candlesync::series::TracingAdapter;
use candlesync::snapshot::BinanceSnapshot;
use candlesync::tui::event::{spawn_event_reader, spawn_tick_timer, update};
use candlesync::tui::{Action, App, ChartView, Event, Tui, restore_terminal, setup_terminal};
use candlesync::websocket::BinanceFeed;
use candlesync::{ChartError, Result};
use tokio::sync::mpsc;
use tracing::info;

/// Redraw cadence for the countdown between deltas.
const TICK_MS: u64 = 250;

type ChartEngine<A> = Engine<BinanceSnapshot, BinanceFeed, A>;

#[tokio::main]
async fn main() -> Result<()> {
    let config = fetch_config()?;

    if std::io::stdout().is_terminal() {
        run_tui(config).await
    } else {
        run_headless(config).await
    }
}

fn build_engine<A>(
    config: &AppConfig,
    adapter: A,
    tx: mpsc::UnboundedSender<EngineEvent>,
) -> Result<ChartEngine<A>>
where
    A: candlesync::series::SeriesAdapter,
{
    let reporter: Arc<dyn FaultReporter> = Arc::new(TracingReporter);
    let loader = BinanceSnapshot::new(&config.binance.rest_url, Arc::clone(&reporter))?;
    let feed = BinanceFeed::new(&config.binance.stream_url, config.binance.reconnect);

    Ok(Engine::new(
        config.chart.engine_config(),
        Arc::new(loader),
        feed,
        adapter,
        reporter,
        tx,
    ))
}

/// Interactive mode: logs go to a file so they do not corrupt the screen.
async fn run_tui(config: AppConfig) -> Result<()> {
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)
        .map_err(|e| {
            ChartError::Io(format!("failed to open {}: {e}", config.log_file.display()))
        })?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();

    let (tx, events) = engine::channel();
    let mut engine = build_engine(&config, ChartView::new(), tx)?;
    let mut app = App::new(&config.chart.symbol, config.chart.interval, config.chart.style);

    let (input_tx, input_rx) = mpsc::unbounded_channel();
    let mut terminal = setup_terminal()?;
    spawn_event_reader(input_tx.clone());
    spawn_tick_timer(input_tx, TICK_MS);

    engine.select_interval(config.chart.interval);
    app.observe(engine.phase(), engine.style());

    let result = event_loop(&mut terminal, &mut engine, &mut app, input_rx, events).await;

    engine.shutdown().await;
    restore_terminal(&mut terminal)?;
    result
}

async fn event_loop(
    terminal: &mut Tui,
    engine: &mut ChartEngine<ChartView>,
    app: &mut App,
    mut input_rx: mpsc::UnboundedReceiver<Event>,
    mut events: mpsc::UnboundedReceiver<EngineEvent>,
) -> Result<()> {
    while !app.should_quit {
        terminal
            .draw(|frame| candlesync::tui::render(frame, &*app, engine.adapter()))
            .map_err(|e| ChartError::Io(format!("failed to draw: {e}")))?;

        tokio::select! {
            Some(event) = input_rx.recv() => {
                if let Some(Action::Command(command)) = update(app, event) {
                    engine.apply(command);
                }
            }
            Some(event) = events.recv() => engine.handle(event),
            else => break,
        }
        app.observe(engine.phase(), engine.style());
    }

    Ok(())
}

/// Non-interactive mode: render calls are logged to stderr until Ctrl-C.
async fn run_headless(config: AppConfig) -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let (tx, events) = engine::channel();
    let engine = build_engine(&config, TracingAdapter::new(), tx)?;

    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let _ = command_tx.send(Command::SelectInterval(config.chart.interval));
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, shutting down");
        }
        let _ = command_tx.send(Command::Shutdown);
    });

    let adapter = engine.run(command_rx, events).await;
    info!(
        redraws = adapter.redraws(),
        updates = adapter.updates(),
        "Stopped"
    );
    Ok(())
}
