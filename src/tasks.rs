//! Cancelable background tasks that report to the UI over a channel.
//!
//! A [`TaskHandle`] aborts its task when dropped, so a task never outlives
//! the view that started it.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

/// Owner of a spawned task.
#[derive(Debug)]
pub struct TaskHandle {
    handle: JoinHandle<()>,
}

impl TaskHandle {
    pub fn spawn<F>(rt: &Handle, future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            handle: rt.spawn(future),
        }
    }

    /// Abort the task now.
    pub fn cancel(self) {
        drop(self);
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Request counter for background results.
///
/// Aborting a task cannot recall a message it already sent, so each request
/// takes a new generation and carries it in its message; the receiver drops
/// any message whose generation is no longer current.
#[derive(Debug, Default)]
pub struct Generation(u64);

impl Generation {
    /// Start a new request, making every earlier one stale.
    pub fn next(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.0 == generation
    }
}

/// Shortest period a ticker runs at.
const MIN_TICK: Duration = Duration::from_millis(1);

/// Send `make()` every `period` until cancelled or the receiver is gone.
/// The first message arrives one period after spawning. A zero period is
/// raised to one millisecond.
pub fn spawn_ticker<M, F>(rt: &Handle, period: Duration, tx: UnboundedSender<M>, make: F) -> TaskHandle
where
    M: Send + 'static,
    F: Fn() -> M + Send + 'static,
{
    TaskHandle::spawn(rt, async move {
        let mut interval = tokio::time::interval(period.max(MIN_TICK));
        // The first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            if tx.send(make()).is_err() {
                break;
            }
        }
    })
}

/// Read `path` in the background and send `map(result)`.
pub fn spawn_file_read<M, F>(rt: &Handle, path: PathBuf, tx: UnboundedSender<M>, map: F) -> TaskHandle
where
    M: Send + 'static,
    F: FnOnce(std::io::Result<Vec<u8>>) -> M + Send + 'static,
{
    TaskHandle::spawn(rt, async move {
        let result = tokio::fs::read(&path).await;
        let _ = tx.send(map(result));
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_ticker_sends_until_cancelled() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let ticker = spawn_ticker(&Handle::current(), Duration::from_millis(5), tx, || "tick");

        assert_eq!(rx.recv().await, Some("tick"));
        ticker.cancel();

        // Cancelling drops the task's sender, which closes the channel
        let drained = tokio::time::timeout(Duration::from_secs(2), async {
            while rx.recv().await.is_some() {}
        })
        .await;
        assert!(drained.is_ok());
    }

    #[tokio::test]
    async fn test_dropping_handle_cancels() {
        let (tx, mut rx) = mpsc::unbounded_channel::<u8>();
        {
            let _ticker = spawn_ticker(&Handle::current(), Duration::from_secs(3600), tx, || 1);
        }
        let closed = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await;
        assert_eq!(closed.ok(), Some(None));
    }

    #[tokio::test]
    async fn test_zero_period_ticker_still_ticks() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let ticker = spawn_ticker(&Handle::current(), Duration::ZERO, tx, || "tick");
        let first = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await;
        assert_eq!(first.ok(), Some(Some("tick")));
        assert!(!ticker.is_finished());
    }

    #[tokio::test]
    async fn test_cancelled_read_result_is_stale() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("import.json");
        std::fs::write(&path, b"{}").unwrap();

        let mut generation = Generation::default();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let first = generation.next();
        let task = spawn_file_read(&Handle::current(), path.clone(), tx.clone(), move |_| first);
        // Let the read finish and deliver before cancelling
        let delivered = rx.recv().await.unwrap();
        task.cancel();
        generation.next();
        assert!(!generation.is_current(delivered));

        // A newer read is current until it is replaced
        let second = generation.next();
        let _task = spawn_file_read(&Handle::current(), path, tx, move |_| second);
        let delivered = rx.recv().await.unwrap();
        assert!(generation.is_current(delivered));
        assert!(!generation.is_current(first));
    }

    #[tokio::test]
    async fn test_file_read_reports_result() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("import.json");
        std::fs::write(&path, b"{}").unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let _task = spawn_file_read(&Handle::current(), path, tx.clone(), |r| r.map_err(|e| e.to_string()));
        assert_eq!(rx.recv().await, Some(Ok(b"{}".to_vec())));

        let _task = spawn_file_read(&Handle::current(), dir.path().join("missing.json"), tx, |r| {
            r.map_err(|e| e.to_string())
        });
        assert!(matches!(rx.recv().await, Some(Err(_))));
    }
}
