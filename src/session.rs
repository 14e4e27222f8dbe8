//! The UI thread's handle on the single running download.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{info, warn};

use crate::cancel::CancellationToken;
use crate::download::{start_download, DownloadJob};
use crate::error::Result;
use crate::extractor::Extractor;
use crate::progress::{self, ProgressMessage, ProgressReceiver};

/// How often the UI drains the progress queue.
pub const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// How long closing the window waits for a canceled worker.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// What one tick of the polling loop observed.
#[derive(Debug, Default)]
pub struct PollResult {
    /// Every message queued since the last poll, oldest first.
    pub messages: Vec<ProgressMessage>,
    /// The worker thread has exited. All of its messages are in `messages`
    /// or an earlier poll.
    pub worker_exited: bool,
}

pub struct JobSession {
    rx: ProgressReceiver,
    handle: Option<JoinHandle<()>>,
    token: CancellationToken,
}

impl JobSession {
    /// Spawns the worker with a fresh cancellation token.
    pub fn start(job: DownloadJob, extractor: Arc<dyn Extractor>) -> Result<Self> {
        let (tx, rx) = progress::channel();
        let token = CancellationToken::new();
        let handle = start_download(job, extractor, tx, token.clone())?;
        Ok(Self {
            rx,
            handle: Some(handle),
            token,
        })
    }

    /// Drains the queue, then checks whether the worker is still running.
    ///
    /// When the worker turns out to have exited, the queue is drained once
    /// more so a terminal message sent right before exit is never missed.
    pub fn poll(&mut self) -> PollResult {
        let mut messages = self.rx.drain();
        let worker_exited = !self.is_alive();
        if worker_exited {
            messages.extend(self.rx.drain());
            self.reap();
        }
        PollResult {
            messages,
            worker_exited,
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_canceled(&self) -> bool {
        self.token.is_canceled()
    }

    pub fn is_alive(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Signals cancellation and waits up to `grace` for the worker to stop.
    ///
    /// Returns `false` when the worker was still running at the deadline; it
    /// is then left detached.
    pub fn shutdown(mut self, grace: Duration) -> bool {
        self.cancel();
        let deadline = Instant::now() + grace;
        while self.is_alive() {
            if Instant::now() >= deadline {
                warn!("Download worker still running after {:?}, leaving it", grace);
                return false;
            }
            thread::sleep(Duration::from_millis(10));
        }
        self.reap();
        info!("Download worker stopped");
        true
    }

    fn reap(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Download worker panicked");
            }
        }
    }
}
