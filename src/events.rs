//! Event types and the main event loop driver for the terminal dashboard.
//!
//! This module defines the [`Event`] enum (keyboard input, ticks and fetch
//! results) and the [`EventHandler`], which runs a background task that polls
//! crossterm for key events and emits periodic [`Event::Tick`]s. Fetch tasks
//! spawned by `main.rs` post their results through [`EventHandler::tx`].

use crate::models::{StateVector, WeatherResponse};
use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::error;

/// Events processed by the application event loop.
pub enum Event {
    /// Periodic tick used for redraws and the weather refresh timer.
    Tick,
    /// User key press from the terminal.
    Input(KeyEvent),
    /// Result of one flight fetch.
    FlightUpdate {
        /// Request token the fetch was issued with.
        token: u64,
        /// Fetched flights; empty when the fetch failed.
        flights: Vec<StateVector>,
        /// When this update was produced.
        timestamp: Instant,
        /// Whether the API request succeeded.
        is_success: bool,
    },
    /// Result of one weather fetch; `None` when it failed.
    WeatherUpdate {
        token: u64,
        data: Option<WeatherResponse>,
    },
}

/// Multiplexes terminal input and ticks into a single event stream.
///
/// Holds an unbounded channel: the sender ([`tx`](EventHandler::tx)) can be
/// cloned and given to fetch tasks, while the receiver is consumed by
/// [`next`](EventHandler::next) in the main loop.
pub struct EventHandler {
    pub tx: mpsc::UnboundedSender<Event>,
    rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
    /// Creates a new event handler and spawns the input/tick task.
    ///
    /// The task polls crossterm with a timeout of `tick_rate_ms`. If the
    /// terminal stops answering it logs the error and exits; the main loop
    /// keeps receiving fetch results until every sender is gone.
    pub fn new(tick_rate_ms: u64) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let event_tx = tx.clone();

        tokio::spawn(async move {
            let tick_rate = Duration::from_millis(tick_rate_ms);
            let mut last_tick = Instant::now();
            loop {
                let timeout = tick_rate
                    .checked_sub(last_tick.elapsed())
                    .unwrap_or(Duration::from_secs(0));
                match event::poll(timeout) {
                    Ok(true) => match event::read() {
                        Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                            event_tx.send(Event::Input(key)).ok();
                        }
                        Ok(_) => {}
                        Err(e) => {
                            error!("Terminal read failed: {}", e);
                            break;
                        }
                    },
                    Ok(false) => {}
                    Err(e) => {
                        error!("Terminal poll failed: {}", e);
                        break;
                    }
                }
                if last_tick.elapsed() >= tick_rate {
                    if event_tx.send(Event::Tick).is_err() {
                        break;
                    }
                    last_tick = Instant::now();
                }
            }
        });

        Self { tx, rx }
    }

    /// Receives the next event from the channel.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}
