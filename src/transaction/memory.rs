//! In-memory tracing runtime.
//!
//! Records every transaction it starts so hosts can buffer spans before
//! handing them to an exporter, and so tests can inspect exactly what the
//! controller did. Finished records stay buffered until
//! [`InMemoryTracer::drain_finished`] takes them.

use super::{Transaction, TransactionFactory};
use crate::core::TransactionContext;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Everything known about one recorded transaction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Unique transaction identifier
    pub id: Uuid,
    /// Current context
    pub context: TransactionContext,
    /// Explicit sampling decision, if any
    pub sampled: Option<bool>,
    /// When the transaction was started
    pub started_at: DateTime<Utc>,
    /// When the transaction was finished
    pub finished_at: Option<DateTime<Utc>>,
    /// Number of `update_with_context` calls received
    pub updates: usize,
}

impl TransactionRecord {
    fn start(context: TransactionContext) -> Self {
        Self {
            id: Uuid::new_v4(),
            sampled: context.sampled,
            context,
            started_at: Utc::now(),
            finished_at: None,
            updates: 0,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }

    /// True when sampling was explicitly forced off.
    pub fn is_unsampled(&self) -> bool {
        self.sampled == Some(false)
    }

    /// Time between start and finish, `None` while still open.
    pub fn duration(&self) -> Option<Duration> {
        self.finished_at
            .and_then(|end| end.signed_duration_since(self.started_at).to_std().ok())
    }
}

/// Handle to a transaction recorded by [`InMemoryTracer`].
#[derive(Clone, Debug)]
pub struct RecordedTransaction {
    record: Arc<Mutex<TransactionRecord>>,
}

impl RecordedTransaction {
    pub fn id(&self) -> Uuid {
        self.record.lock().id
    }

    pub fn record(&self) -> TransactionRecord {
        self.record.lock().clone()
    }
}

impl Transaction for RecordedTransaction {
    fn context(&self) -> TransactionContext {
        self.record.lock().context.clone()
    }

    fn set_sampled(&mut self, sampled: bool) {
        let mut record = self.record.lock();
        record.sampled = Some(sampled);
        record.context.sampled = Some(sampled);
    }

    fn finish(&mut self) {
        let mut record = self.record.lock();
        if record.finished_at.is_none() {
            record.finished_at = Some(Utc::now());
        }
    }

    fn update_with_context(&mut self, context: TransactionContext) {
        let mut record = self.record.lock();
        if context.sampled.is_some() {
            record.sampled = context.sampled;
        }
        record.context = context;
        record.updates += 1;
    }
}

/// Tracing runtime that keeps every transaction in memory.
///
/// Cloning the tracer shares the underlying records.
///
/// # Example
///
/// ```rust
/// use navspan::core::blank_transaction_context;
/// use navspan::transaction::{InMemoryTracer, Transaction, TransactionFactory};
///
/// let tracer = InMemoryTracer::new();
/// let mut transaction = tracer.start_transaction(blank_transaction_context("router"));
/// transaction.set_sampled(false);
/// transaction.finish();
///
/// let record = tracer.last().unwrap();
/// assert!(record.is_finished());
/// assert!(record.is_unsampled());
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryTracer {
    records: Arc<Mutex<Vec<Arc<Mutex<TransactionRecord>>>>>,
}

impl InMemoryTracer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all transactions, in start order.
    pub fn transactions(&self) -> Vec<TransactionRecord> {
        self.records
            .lock()
            .iter()
            .map(|record| record.lock().clone())
            .collect()
    }

    /// Snapshot of the most recently started transaction.
    pub fn last(&self) -> Option<TransactionRecord> {
        self.records.lock().last().map(|record| record.lock().clone())
    }

    /// Number of buffered transactions.
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Transactions that have not been finished yet.
    pub fn open_transactions(&self) -> Vec<TransactionRecord> {
        self.transactions()
            .into_iter()
            .filter(|record| !record.is_finished())
            .collect()
    }

    /// Remove finished transactions and return them in start order.
    ///
    /// Open transactions stay buffered until they finish.
    pub fn drain_finished(&self) -> Vec<TransactionRecord> {
        let mut records = self.records.lock();
        let mut finished = Vec::new();
        records.retain(|record| {
            let record = record.lock();
            if record.is_finished() {
                finished.push(record.clone());
                false
            } else {
                true
            }
        });
        finished
    }
}

impl TransactionFactory for InMemoryTracer {
    type Transaction = RecordedTransaction;

    fn start_transaction(&self, context: TransactionContext) -> RecordedTransaction {
        let record = Arc::new(Mutex::new(TransactionRecord::start(context)));
        self.records.lock().push(Arc::clone(&record));
        RecordedTransaction { record }
    }
}
