//! `tradepost-infra` — record store collaborators.
//!
//! The domain treats persistence as an external collaborator offering plain
//! keyed CRUD over each record type. This crate provides the store contract
//! and the in-memory implementation backing all collections.

pub mod record_store;

pub use record_store::{InMemoryStore, RecordStore, StoreError, StoreResult};
