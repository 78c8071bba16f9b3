//! Per-scope write serialization.
//!
//! Each scope admits one outstanding write at a time; a second commit or
//! removal requested while one is in flight queues behind it and starts only
//! after the first completes, success or failure. `tokio::sync::Mutex` hands
//! the lock to waiters in FIFO order, which is exactly that queue. Reads
//! never take the gate.

use tokio::sync::{Mutex, MutexGuard};

/// FIFO admission gate for a scope's write operations.
#[derive(Debug, Default)]
pub(crate) struct Sequencer {
    gate: Mutex<()>,
}

impl Sequencer {
    pub(crate) fn new() -> Self {
        Sequencer::default()
    }

    /// Wait for the scope's write slot.
    pub(crate) async fn acquire(&self) -> MutexGuard<'_, ()> {
        self.gate.lock().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_writes_never_overlap() {
        let sequencer = Arc::new(Sequencer::new());
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let sequencer = Arc::clone(&sequencer);
            let in_flight = Arc::clone(&in_flight);
            let peak = Arc::clone(&peak);

            handles.push(tokio::spawn(async move {
                let _slot = sequencer.acquire().await;
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(peak.load(Ordering::SeqCst), 1);
        assert_eq!(in_flight.load(Ordering::SeqCst), 0);
    }
}
