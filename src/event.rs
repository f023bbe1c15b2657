use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind, MouseEvent};
use tokio::sync::mpsc;

use crate::error::Result;
use crate::tree::LoadOutcome;

/// Application events.
#[derive(Debug)]
pub enum Event {
    /// A key press event.
    Key(KeyEvent),
    /// A mouse event.
    Mouse(MouseEvent),
    /// A periodic tick for rendering.
    Tick,
    /// Terminal resize; the next draw picks up the new size.
    Resize,
    /// A lazy child load finished.
    ChildrenLoaded(LoadOutcome),
}

/// Async event handler that polls crossterm events and forwards them via a channel.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    tx: mpsc::UnboundedSender<Event>,
}

impl EventHandler {
    /// Create a new EventHandler with the given tick rate.
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let event_tx = tx.clone();

        tokio::task::spawn_blocking(move || loop {
            let next = if event::poll(tick_rate).unwrap_or(false) {
                match event::read() {
                    Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                        Event::Key(key)
                    }
                    Ok(CrosstermEvent::Mouse(mouse)) => Event::Mouse(mouse),
                    Ok(CrosstermEvent::Resize(..)) => Event::Resize,
                    _ => continue,
                }
            } else {
                Event::Tick
            };
            if event_tx.send(next).is_err() {
                break;
            }
        });

        Self { rx, tx }
    }

    /// Forward every load completion from `loads` into the event stream.
    pub fn forward_loads(&self, mut loads: mpsc::UnboundedReceiver<LoadOutcome>) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            while let Some(outcome) = loads.recv().await {
                if tx.send(Event::ChildrenLoaded(outcome)).is_err() {
                    break;
                }
            }
        });
    }

    /// Receive the next event (blocks until available).
    pub async fn next(&mut self) -> Result<Event> {
        self.rx
            .recv()
            .await
            .ok_or_else(|| crate::error::AppError::Terminal("Event channel closed".into()))
    }
}
