//! Shared test backend that records submitted batches instead of executing
//! them, with an optional delay and in-flight instrumentation.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use lexstore::backend::{RelationalBackend, Row, Statement};
use lexstore::error::Result;

#[derive(Debug, Default)]
pub struct RecordingBackend {
    max_parameters: usize,
    delay: Option<Duration>,
    pub batches: Mutex<Vec<Vec<Statement>>>,
    pub in_flight: AtomicUsize,
    pub peak_in_flight: AtomicUsize,
}

impl RecordingBackend {
    pub fn new(max_parameters: usize) -> Self {
        RecordingBackend {
            max_parameters,
            delay: None,
            batches: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn recorded_batches(&self) -> Vec<Vec<Statement>> {
        self.batches.lock().unwrap().clone()
    }
}

impl RelationalBackend for RecordingBackend {
    fn max_bound_parameters(&self) -> usize {
        self.max_parameters
    }

    async fn execute(&self, stmt: Statement) -> Result<()> {
        self.execute_batch(vec![stmt]).await
    }

    async fn execute_batch(&self, stmts: Vec<Statement>) -> Result<()> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.batches.lock().unwrap().push(stmts);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }

    async fn query(&self, _stmt: Statement) -> Result<Vec<Row>> {
        Ok(Vec::new())
    }

    async fn query_first(&self, _stmt: Statement) -> Result<Option<Row>> {
        Ok(None)
    }
}
