use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};

use crate::error::FetchError;
use crate::item::QuizItem;
use crate::quiz::FetchTicket;
use crate::source::QuestionSource;

/// Unified event type consumed by the app runner
#[derive(Debug)]
pub enum QuizEvent {
    Key(KeyEvent),
    Resize,
    Tick,
    Loaded {
        ticket: FetchTicket,
        result: Result<Vec<QuizItem>, FetchError>,
    },
}

/// Source of terminal events (keyboard, resize, etc.)
pub trait QuizEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<QuizEvent, RecvTimeoutError>;

    /// Channel other producers (question loaders) can post into.
    fn sender(&self) -> Sender<QuizEvent>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    tx: Sender<QuizEvent>,
    rx: Receiver<QuizEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let key_tx = tx.clone();

        std::thread::spawn(move || loop {
            let sent = match event::read() {
                Ok(CtEvent::Key(key)) => key_tx.send(QuizEvent::Key(key)),
                Ok(CtEvent::Resize(_, _)) => key_tx.send(QuizEvent::Resize),
                Ok(_) => Ok(()),
                Err(err) => {
                    tracing::error!(error = %err, "terminal event stream closed");
                    break;
                }
            };
            if sent.is_err() {
                break;
            }
        });

        Self { tx, rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<QuizEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    fn sender(&self) -> Sender<QuizEvent> {
        self.tx.clone()
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    tx: Sender<QuizEvent>,
    rx: Receiver<QuizEvent>,
}

impl TestEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }
}

impl Default for TestEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<QuizEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    fn sender(&self) -> Sender<QuizEvent> {
        self.tx.clone()
    }
}

/// Fetch questions off the UI thread; the result comes back as `Loaded`.
pub fn spawn_fetch(
    source: Arc<dyn QuestionSource>,
    ticket: FetchTicket,
    tx: Sender<QuizEvent>,
) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        let result = source.fetch(ticket.limit);
        if tx.send(QuizEvent::Loaded { ticket, result }).is_err() {
            tracing::debug!(generation = ticket.generation, "event loop gone before questions arrived");
        }
    })
}

/// Runner that advances the application one event/tick at a time
pub struct Runner<E: QuizEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: QuizEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    pub fn sender(&self) -> Sender<QuizEvent> {
        self.event_source.sender()
    }

    /// Blocks up to tick interval and returns the next event, or Tick on timeout
    pub fn step(&self) -> QuizEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => QuizEvent::Tick,
        }
    }
}
