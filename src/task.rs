//! A minimal background job: start a closure on its own thread, poll for completion from a host loop, and cancel it
//! cooperatively.
//!
//! ```text
//!            start()                 poll_until_done() sees the done flag
//!   Idle ───────────────▶ Running ─────────────────────────────────────▶ Done
//!     ▲                      │                                            │
//!     └──────── reset() ─────┴─────────────────── reset() ────────────────┘
//! ```
//!
//! The done flag is a mutex-guarded boolean that is written by the worker thread after its result has been sent, and
//! read by the host. The result travels over a one-slot channel and is handed to the `on_finished` callback on the
//! thread that polls, never on the worker.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::Receiver;
use log::{debug, warn};
use parking_lot::Mutex;

use crate::{Error, Result};

/// Shared cancellation request, checked by jobs at their own checkpoints.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Returns [`Error::Cancelled`] once cancellation was requested.
    #[inline]
    pub fn checkpoint(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TaskState {
    Idle,
    Running,
    Done,
}

/// Marks the task done when the worker's closure returns or unwinds.
struct DoneGuard(Arc<Mutex<bool>>);

impl Drop for DoneGuard {
    fn drop(&mut self) {
        *self.0.lock() = true;
    }
}

/// A job producing a `T` on a dedicated thread.
pub struct Task<T> {
    name: String,
    state: TaskState,
    done: Arc<Mutex<bool>>,
    cancel: CancelToken,
    handle: Option<JoinHandle<()>>,
    result: Option<Receiver<T>>,
    aborted: bool,
}

impl<T: Send + 'static> Task<T> {
    /// `name` becomes the worker thread's name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: TaskState::Idle,
            done: Arc::new(Mutex::new(false)),
            cancel: CancelToken::new(),
            handle: None,
            result: None,
            aborted: false,
        }
    }

    #[inline]
    pub fn state(&self) -> TaskState {
        self.state
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Spawns `job` and returns immediately.
    pub fn start<F>(&mut self, job: F) -> Result<()>
    where
        F: FnOnce(&CancelToken) -> T + Send + 'static,
    {
        if self.state != TaskState::Idle {
            return Err(Error::InvalidState("a task can only be started when idle"));
        }

        // Fresh shared state, so a thread detached by an earlier reset can never finish this run.
        self.done = Arc::new(Mutex::new(false));
        self.cancel = CancelToken::new();
        self.aborted = false;

        let (sender, receiver) = crossbeam_channel::bounded(1);
        let done = DoneGuard(Arc::clone(&self.done));
        let cancel = self.cancel.clone();
        let handle = thread::Builder::new()
            .name(self.name.clone())
            .spawn(move || {
                let _done = done;
                let output = job(&cancel);
                // Nobody is listening after a reset or abort.
                let _ = sender.send(output);
            })
            .map_err(Error::Spawn)?;

        debug!("task {} started", self.name);
        self.handle = Some(handle);
        self.result = Some(receiver);
        self.state = TaskState::Running;
        Ok(())
    }

    /// Whether the worker has finished. Both the worker's write and this read hold the flag's lock.
    #[inline]
    pub fn is_done(&self) -> bool {
        *self.done.lock()
    }

    /// Non-blocking. Returns `true` once the task is done, calling `on_finished` with the outcome the first time only.
    ///
    /// A job that panicked is reported as [`Error::WorkerPanicked`], an aborted one as [`Error::Aborted`].
    pub fn poll_until_done(&mut self, on_finished: impl FnOnce(Result<T>)) -> bool {
        match self.state {
            TaskState::Idle => false,
            TaskState::Done => true,
            TaskState::Running => {
                let outcome = if self.aborted {
                    Err(Error::Aborted)
                } else if self.is_done() {
                    self.collect()
                } else {
                    return false;
                };
                self.state = TaskState::Done;
                on_finished(outcome);
                true
            }
        }
    }

    fn collect(&mut self) -> Result<T> {
        if let Some(handle) = self.handle.take() {
            // The done flag is raised just before the thread exits; don't wait on the stragglers.
            if handle.is_finished() && handle.join().is_err() {
                debug!("task {} unwound", self.name);
            }
        }
        self.result
            .take()
            .and_then(|receiver| receiver.try_recv().ok())
            .ok_or(Error::WorkerPanicked)
    }

    /// Asks the job to stop at its next checkpoint. The task still has to be polled to completion.
    pub fn interrupt(&self) {
        if self.state == TaskState::Running {
            debug!("task {} interrupted", self.name);
            self.cancel.cancel();
        }
    }

    /// Shutdown only. Threads cannot be killed, so the job is cancelled and detached; whatever it was doing is
    /// abandoned and its result is never read. The next poll reports [`Error::Aborted`].
    pub fn abort(&mut self) {
        if self.state != TaskState::Running {
            return;
        }
        warn!("task {} aborted", self.name);
        self.cancel.cancel();
        self.handle = None;
        self.result = None;
        self.aborted = true;
    }

    /// Returns to [`TaskState::Idle`]. A running job is cancelled and detached.
    pub fn reset(&mut self) {
        if self.state == TaskState::Running {
            self.cancel.cancel();
        }
        self.state = TaskState::Idle;
        self.handle = None;
        self.result = None;
        self.aborted = false;
        self.done = Arc::new(Mutex::new(false));
    }
}

impl<T> Drop for Task<T> {
    fn drop(&mut self) {
        if self.state == TaskState::Running {
            self.cancel.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    /// Polls like a host loop would, one tick at a time.
    fn poll_to_end<T: Send + 'static>(task: &mut Task<T>) -> Result<T> {
        let mut outcome = None;
        for _ in 0..5_000 {
            if task.poll_until_done(|r| outcome = Some(r)) {
                break;
            }
            thread::sleep(Duration::from_millis(1));
        }
        outcome.expect("task did not finish")
    }

    #[test]
    fn delivers_the_result_once_on_the_polling_thread() {
        let mut task = Task::new("answer");
        assert!(!task.poll_until_done(|_: Result<i32>| panic!("idle task finished")));

        task.start(|_| 42).unwrap();
        assert_eq!(task.state(), TaskState::Running);
        assert_eq!(poll_to_end(&mut task).unwrap(), 42);
        assert_eq!(task.state(), TaskState::Done);
        assert!(task.is_done());

        // Later polls report done without calling back again.
        assert!(task.poll_until_done(|_| panic!("delivered twice")));
    }

    #[test]
    fn cannot_start_twice() {
        let mut task = Task::new("twice");
        task.start(|_| ()).unwrap();
        assert!(matches!(task.start(|_| ()), Err(Error::InvalidState(_))));
        poll_to_end(&mut task).unwrap();
    }

    #[test]
    fn interrupt_reaches_the_job() {
        let mut task = Task::new("spin");
        task.start(|cancel| loop {
            if let Err(e) = cancel.checkpoint() {
                return Err::<(), _>(e);
            }
            thread::sleep(Duration::from_millis(1));
        })
        .unwrap();

        task.interrupt();
        assert!(matches!(poll_to_end(&mut task).unwrap(), Err(Error::Cancelled)));
    }

    #[test]
    fn panics_are_reported_not_propagated() {
        let mut task: Task<()> = Task::new("boom");
        task.start(|_| panic!("boom")).unwrap();
        assert!(matches!(poll_to_end(&mut task), Err(Error::WorkerPanicked)));
    }

    #[test]
    fn abort_detaches_and_reports() {
        let mut task = Task::new("stuck");
        task.start(|cancel| {
            while !cancel.is_cancelled() {
                thread::sleep(Duration::from_millis(1));
            }
        })
        .unwrap();

        task.abort();
        assert!(matches!(poll_to_end(&mut task), Err(Error::Aborted)));
    }

    #[test]
    fn reset_allows_a_restart() {
        let mut task = Task::new("again");
        task.start(|cancel| {
            while !cancel.is_cancelled() {
                thread::sleep(Duration::from_millis(1));
            }
            1
        })
        .unwrap();

        task.reset();
        assert_eq!(task.state(), TaskState::Idle);
        assert!(!task.is_done());

        task.start(|_| 2).unwrap();
        assert_eq!(poll_to_end(&mut task).unwrap(), 2);
    }
}
