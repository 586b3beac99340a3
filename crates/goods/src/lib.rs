//! `tradepost-goods` — the Good entity: a stocked item with a price.

pub mod good;

pub use good::{Good, GoodPatch, Material, MAX_STOCK};
