use std::sync::mpsc::{self, Receiver, RecvError, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};
use tracing::{debug, trace};

/// Upper bound for the refresh interval while a workout is running
pub const MAX_REFRESH_MS: u64 = 1000;

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    /// Terminal regained focus; elapsed time must be recomputed immediately
    FocusGained,
    Tick,
}

/// Source of terminal events (keyboard, resize, focus)
pub trait EventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;
    /// Block until an event arrives or the source goes away.
    fn recv(&self) -> Result<AppEvent, RecvError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<AppEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let ev = match event::read() {
                // Windows reports both press and release
                Ok(CtEvent::Key(key)) if key.kind != KeyEventKind::Release => AppEvent::Key(key),
                Ok(CtEvent::Resize(_, _)) => AppEvent::Resize,
                Ok(CtEvent::FocusGained) => AppEvent::FocusGained,
                Ok(_) => continue,
                Err(e) => {
                    debug!(error = %e, "terminal event reader stopped");
                    break;
                }
            };
            if tx.send(ev).is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    fn recv(&self) -> Result<AppEvent, RecvError> {
        self.rx.recv()
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker, capped at `MAX_REFRESH_MS`
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.min(Duration::from_millis(MAX_REFRESH_MS)),
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms.max(1)))
    }
}

impl Default for FixedTicker {
    fn default() -> Self {
        Self::from_millis(MAX_REFRESH_MS)
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<AppEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<AppEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    fn recv(&self) -> Result<AppEvent, RecvError> {
        self.rx.recv()
    }
}

/// Runner that advances the application one event/tick at a time.
///
/// The runner is the only source of periodic wake-ups, so there is never more
/// than one refresh interval in flight.
pub struct Runner<E: EventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: EventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    pub fn interval(&self) -> Duration {
        self.ticker.interval()
    }

    /// With `ticking`, waits at most one interval and yields `Tick` on timeout.
    /// Without it, blocks until input arrives. `None` once the source is gone.
    pub fn step(&self, ticking: bool) -> Option<AppEvent> {
        if ticking {
            match self.event_source.recv_timeout(self.ticker.interval()) {
                Ok(ev) => Some(ev),
                Err(RecvTimeoutError::Timeout) => {
                    trace!("tick");
                    Some(AppEvent::Tick)
                }
                Err(RecvTimeoutError::Disconnected) => None,
            }
        } else {
            self.event_source.recv().ok()
        }
    }
}
