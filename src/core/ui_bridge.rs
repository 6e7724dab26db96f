//! Synchronous calls from the server thread onto the UI thread.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐   crossbeam channel (UiJob)   ┌──────────────────────┐
//! │   Server Thread      │  ──────────────────────────▶  │   UI Thread          │
//! │                      │                               │   UiDispatcher       │
//! │ UiCallBridge::invoke │                               │   pump() / run()     │
//! │   recv_timeout() ◀───┼──── one-shot result ──────────┤   job(&mut host)     │
//! └──────────────────────┘                               └──────────────────────┘
//! ```
//!
//! The UI host object lives inside [`UiDispatcher`] and never crosses
//! threads; the server thread only ever sends boxed closures.
//!
//! # Outcomes
//!
//! [`UiCallBridge::invoke`] waits for a one-shot completion message for at
//! most the configured timeout. A timed-out call is **not** cancelled: the
//! job stays queued and runs whenever the UI loop gets to it.

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError, bounded, unbounded};
use log::{debug, error, warn};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use crate::error::{RemoteError, RemoteResult};
use crate::host::UiHost;

/// Unit of work executed on the UI thread
pub type UiJob = Box<dyn FnOnce(&mut dyn UiHost) + Send + 'static>;

/// Create a connected queue (server side) and dispatcher (UI side).
pub fn ui_channel<H: UiHost>(host: H) -> (UiQueue, UiDispatcher<H>) {
    let (tx, rx) = unbounded();
    (UiQueue { tx }, UiDispatcher { rx, host })
}

/// Sending half: posts jobs to the UI thread.
#[derive(Clone)]
pub struct UiQueue {
    tx: Sender<UiJob>,
}

impl UiQueue {
    /// Queue a job without waiting for it.
    pub fn post<F>(&self, job: F) -> RemoteResult<()>
    where
        F: FnOnce(&mut dyn UiHost) + Send + 'static,
    {
        self.tx.send(Box::new(job)).map_err(|_| RemoteError::UiUnavailable)
    }

    /// Jobs queued and not yet picked up by the UI thread.
    pub fn pending(&self) -> usize {
        self.tx.len()
    }
}

/// Receiving half, owned by the UI thread together with the host object.
pub struct UiDispatcher<H: UiHost> {
    rx: Receiver<UiJob>,
    host: H,
}

impl<H: UiHost> UiDispatcher<H> {
    /// A panicking job is logged and dropped; the loop keeps going.
    fn execute(&mut self, job: UiJob) {
        let host = &mut self.host;
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| job(host))) {
            error!("UI job panicked: {}", panic_message(payload.as_ref()));
        }
    }

    /// Run every queued job without blocking. Call from the host event loop.
    /// Returns the number of jobs executed.
    pub fn pump(&mut self) -> usize {
        let mut count = 0;
        loop {
            match self.rx.try_recv() {
                Ok(job) => {
                    self.execute(job);
                    count += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        count
    }

    /// Wait up to `timeout` for the first job, then drain the queue.
    pub fn wait_and_pump(&mut self, timeout: Duration) -> usize {
        match self.rx.recv_timeout(timeout) {
            Ok(job) => {
                self.execute(job);
                1 + self.pump()
            }
            Err(_) => 0,
        }
    }

    /// Block and execute jobs in order until every [`UiQueue`] is dropped.
    pub fn run(&mut self) {
        debug!("UI dispatcher running");
        while let Ok(job) = self.rx.recv() {
            self.execute(job);
        }
        debug!("UI dispatcher stopped (all queues closed)");
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

/// How a bridged call ended, as seen from the calling thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    /// Ran on the UI thread and succeeded
    Completed,
    /// Ran on the UI thread and failed or panicked
    Failed(String),
    /// Did not finish before the timeout; still queued or still running
    TimedOut,
    /// UI thread is gone, or dropped the job without running it
    Unavailable,
}

/// Blocking call mechanism onto the UI thread.
#[derive(Clone)]
pub struct UiCallBridge {
    queue: UiQueue,
    timeout: Duration,
}

impl UiCallBridge {
    pub fn new(queue: UiQueue, timeout: Duration) -> Self {
        Self { queue, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `work` on the UI thread and wait for it, at most `timeout`.
    ///
    /// Errors and panics inside `work` are logged on the UI thread and come
    /// back as [`CallOutcome::Failed`]; they never propagate.
    pub fn invoke<F>(&self, label: &str, work: F) -> CallOutcome
    where
        F: FnOnce(&mut dyn UiHost) -> RemoteResult<()> + Send + 'static,
    {
        let (done_tx, done_rx) = bounded::<Result<(), String>>(1);
        let job_label = label.to_string();

        let posted = self.queue.post(move |host| {
            let result = match panic::catch_unwind(AssertUnwindSafe(|| work(host))) {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(e.to_string()),
                Err(payload) => Err(panic_message(payload.as_ref())),
            };
            if let Err(msg) = &result {
                error!("UI call {} failed: {}", job_label, msg);
            }
            // Caller may already have given up waiting
            let _ = done_tx.send(result);
        });

        if posted.is_err() {
            warn!("UI call {} dropped: UI thread unavailable", label);
            return CallOutcome::Unavailable;
        }

        match done_rx.recv_timeout(self.timeout) {
            Ok(Ok(())) => CallOutcome::Completed,
            Ok(Err(msg)) => CallOutcome::Failed(msg),
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    "UI call {} still pending after {} ms, continuing",
                    label,
                    self.timeout.as_millis()
                );
                CallOutcome::TimedOut
            }
            Err(RecvTimeoutError::Disconnected) => CallOutcome::Unavailable,
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panic: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panic: {}", s)
    } else {
        "panic".to_string()
    }
}
