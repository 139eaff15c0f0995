//! Background work that the UI thread polls instead of blocking on.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

/// Result of polling a [`Task`].
#[derive(Debug, PartialEq, Eq)]
pub enum Poll<T> {
    /// Still running.
    Pending,
    /// Finished with a value. Subsequent polls return [`Poll::Gone`].
    Ready(T),
    /// The worker went away without a value, or the value was already taken.
    Gone,
}

/// A value being computed on a worker thread.
#[derive(Debug)]
pub struct Task<T> {
    rx: Receiver<T>,
}

impl<T: Send + 'static> Task<T> {
    /// Run `work` on a new thread.
    pub fn spawn<F>(work: F) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            // The receiver may be gone if the task was dropped; nothing to do then.
            let _ = tx.send(work());
        });
        Self { rx }
    }

    /// A task that has already finished.
    pub fn ready(value: T) -> Self {
        let (tx, rx) = mpsc::channel();
        let _ = tx.send(value);
        Self { rx }
    }

    /// Check for completion without blocking.
    pub fn poll(&self) -> Poll<T> {
        match self.rx.try_recv() {
            Ok(value) => Poll::Ready(value),
            Err(TryRecvError::Empty) => Poll::Pending,
            Err(TryRecvError::Disconnected) => Poll::Gone,
        }
    }

    /// Block until the task finishes.
    pub fn wait(self) -> Option<T> {
        self.rx.recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn ready_task_yields_once() {
        let task = Task::ready(7);
        assert_eq!(task.poll(), Poll::Ready(7));
        assert_eq!(task.poll(), Poll::Gone);
    }

    #[test]
    fn spawned_task_reports_pending_then_value() {
        let (go_tx, go_rx) = mpsc::channel::<()>();
        let task = Task::spawn(move || {
            go_rx.recv().ok();
            "done"
        });
        assert_eq!(task.poll(), Poll::Pending);
        go_tx.send(()).unwrap();
        assert_eq!(task.wait(), Some("done"));
    }

    #[test]
    fn panicking_worker_is_gone() {
        let task: Task<u8> = Task::spawn(|| panic!("worker failed"));
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(task.wait(), None);
    }
}
