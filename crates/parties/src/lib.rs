//! `tradepost-parties` — the two customer kinds: hunters (buyers) and
//! merchants (sellers).

pub mod party;

pub use party::{
    Hunter, HunterPatch, Merchant, MerchantKind, MerchantPatch, PartyKind, PartyRef, Race,
};
