//! `tradepost-ledger` — transaction records and the logic that keeps stock
//! levels consistent with them.
//!
//! The two core pieces:
//! - [`reconciler`]: applies a set of stock deltas to goods as a unit of
//!   work (validate everything, then write everything).
//! - [`processor`]: validates transaction requests, resolves parties and
//!   goods by name, computes totals, and drives the reconciler for create,
//!   update and delete flows (updates and deletes reverse the original
//!   stock effect first).

pub mod processor;
pub mod reconciler;
pub mod transaction;

pub use processor::{NewLineItem, NewTransaction, TransactionFilter, TransactionProcessor, TxError};
pub use reconciler::{reconcile_stock, StockError};
pub use transaction::{LineItem, Transaction, TransactionKind};
