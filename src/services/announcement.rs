use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;

#[derive(Default)]
struct Timer {
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

/// Single-slot, most-recent-wins announcement with an optional auto-hide.
#[derive(Clone)]
pub struct AnnouncementStore {
    tx: Arc<watch::Sender<Option<String>>>,
    timer: Arc<Mutex<Timer>>,
}

impl AnnouncementStore {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self {
            tx: Arc::new(tx),
            timer: Arc::new(Mutex::new(Timer::default())),
        }
    }

    pub fn current(&self) -> Option<String> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> WatchStream<Option<String>> {
        WatchStream::new(self.tx.subscribe())
    }

    /// Replace the current message. With a duration, it hides itself unless
    /// something newer was shown first. Must run inside a tokio runtime when
    /// `duration` is set.
    pub fn show(&self, message: impl Into<String>, duration: Option<Duration>) {
        let message = message.into();
        let mut timer = self.timer.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = timer.handle.take() {
            handle.abort();
        }
        timer.generation += 1;
        let generation = timer.generation;

        tracing::info!(message = %message, "announcement");
        self.tx.send_replace(Some(message));

        if let Some(duration) = duration {
            let tx = Arc::clone(&self.tx);
            let shared = Arc::clone(&self.timer);
            timer.handle = Some(tokio::spawn(async move {
                tokio::time::sleep(duration).await;
                let mut timer = shared.lock().unwrap_or_else(|e| e.into_inner());
                if timer.generation == generation {
                    timer.handle = None;
                    tx.send_replace(None);
                }
            }));
        }
    }

    pub fn hide(&self) {
        let mut timer = self.timer.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = timer.handle.take() {
            handle.abort();
        }
        timer.generation += 1;
        self.tx.send_replace(None);
    }
}

impl Default for AnnouncementStore {
    fn default() -> Self {
        Self::new()
    }
}
