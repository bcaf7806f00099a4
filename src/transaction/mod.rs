//! Seam to the tracing runtime that owns transactions.
//!
//! The controller never times, samples or submits spans itself. It asks a
//! [`TransactionFactory`] for a new transaction on every dispatch and then
//! only reads and mutates that transaction through [`Transaction`].

mod memory;

pub use memory::{InMemoryTracer, RecordedTransaction, TransactionRecord};

use crate::core::TransactionContext;

/// A live transaction handed out by the tracing runtime.
pub trait Transaction: Send + 'static {
    /// Snapshot of the live context.
    fn context(&self) -> TransactionContext;

    /// Force the sampling decision.
    fn set_sampled(&mut self, sampled: bool);

    /// Close the transaction.
    fn finish(&mut self);

    /// Replace the transaction's name, tags, data and sampling decision.
    fn update_with_context(&mut self, context: TransactionContext);
}

/// Creates transactions, once per dispatch event.
pub trait TransactionFactory: Send + Sync + 'static {
    type Transaction: Transaction;

    fn start_transaction(&self, context: TransactionContext) -> Self::Transaction;
}
