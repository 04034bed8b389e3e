//! Background fetch for the UI thread.
//!
//! The request runs on a worker thread with its own tokio runtime and the
//! outcome comes back over a channel the UI polls once per frame.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;

use super::client::TouClient;
use super::error::TouError;
use super::model::TouRecord;

pub type FetchOutcome = Result<TouRecord, TouError>;

pub struct PendingFetch {
    rx: Receiver<FetchOutcome>,
    alive: Arc<AtomicBool>,
    done: bool,
}

impl PendingFetch {
    /// Fetches the active document, or `version` when given.
    pub fn start(client: TouClient, version: Option<i64>) -> Self {
        Self::spawn(async move {
            match version {
                Some(v) => client.fetch_version(v).await,
                None => client.fetch_active().await,
            }
        })
    }

    pub fn spawn<F>(fut: F) -> Self
    where
        F: Future<Output = FetchOutcome> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let alive = Arc::new(AtomicBool::new(true));
        let worker_alive = alive.clone();

        std::thread::spawn(move || {
            let outcome = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt.block_on(fut),
                Err(e) => Err(TouError::Fetch(format!("could not start runtime: {}", e))),
            };

            if !worker_alive.load(Ordering::Acquire) {
                log::debug!("[Fetch] Gate closed before the fetch finished, dropping result");
                return;
            }
            if tx.send(outcome).is_err() {
                log::debug!("[Fetch] Receiver gone, dropping result");
            }
        });

        Self {
            rx,
            alive,
            done: false,
        }
    }

    /// Non-blocking. Yields the outcome once, then `None` forever.
    pub fn poll(&mut self) -> Option<FetchOutcome> {
        if self.done {
            return None;
        }
        match self.rx.try_recv() {
            Ok(outcome) => {
                self.done = true;
                Some(outcome)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.done = true;
                Some(Err(TouError::Fetch("fetch worker stopped".to_string())))
            }
        }
    }

    pub fn is_done(&self) -> bool {
        self.done
    }
}

impl Drop for PendingFetch {
    fn drop(&mut self) {
        self.alive.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn wait_for(pending: &mut PendingFetch) -> FetchOutcome {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if let Some(outcome) = pending.poll() {
                return outcome;
            }
            assert!(Instant::now() < deadline, "fetch never completed");
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn test_outcome_delivered_once() {
        let outcome: FetchOutcome = Err(TouError::Api("nope".into()));
        let mut pending = PendingFetch::spawn(async move { outcome });
        assert_eq!(wait_for(&mut pending), Err(TouError::Api("nope".into())));
        assert!(pending.is_done());
        assert!(pending.poll().is_none());
    }

    #[test]
    fn test_unreachable_backend_fails() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let client = TouClient::new(&base, &crate::config::HttpConfig::default()).unwrap();
        let mut pending = PendingFetch::start(client, None);
        assert!(matches!(wait_for(&mut pending), Err(TouError::Fetch(_))));
    }

    #[test]
    fn test_worker_panic_reported_as_fetch_error() {
        async fn explode() -> FetchOutcome {
            panic!("worker blew up")
        }
        let mut pending = PendingFetch::spawn(explode());
        assert!(matches!(wait_for(&mut pending), Err(TouError::Fetch(_))));
    }

    #[test]
    fn test_drop_before_completion() {
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
        let (finished_tx, finished_rx) = std::sync::mpsc::channel::<()>();
        let late: FetchOutcome = Err(TouError::Api("late".into()));
        let pending = PendingFetch::spawn(async move {
            let _ = release_rx.recv();
            let _ = finished_tx.send(());
            late
        });
        drop(pending);
        release_tx.send(()).unwrap();
        finished_rx
            .recv_timeout(Duration::from_secs(10))
            .expect("worker should still run to completion");
    }
}
