use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tradepost_core::{DomainError, DomainResult, Entity, GoodId, TransactionId};
use tradepost_parties::PartyRef;

/// Kind of a transaction, which determines the stock effect of its line
/// items.
///
/// `Return` is accepted on the wire for compatibility with existing data;
/// it is stock-sign-equivalent to `Sell` (goods come back into stock) and
/// reverses to `Buy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Buy,
    Sell,
    Return,
}

impl TransactionKind {
    /// Signed stock delta for a single line item of `quantity` units.
    ///
    /// A buy by a hunter depletes the shop's stock; a sell to a merchant
    /// (or a return) replenishes it.
    pub fn signed_delta(&self, quantity: u32) -> i64 {
        match self {
            TransactionKind::Buy => -i64::from(quantity),
            TransactionKind::Sell | TransactionKind::Return => i64::from(quantity),
        }
    }

    /// The kind whose stock effect undoes this one.
    pub fn inverse(&self) -> TransactionKind {
        match self {
            TransactionKind::Buy => TransactionKind::Sell,
            TransactionKind::Sell | TransactionKind::Return => TransactionKind::Buy,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Buy => "buy",
            TransactionKind::Sell => "sell",
            TransactionKind::Return => "return",
        }
    }
}

impl core::str::FromStr for TransactionKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buy" => Ok(TransactionKind::Buy),
            "sell" => Ok(TransactionKind::Sell),
            "return" => Ok(TransactionKind::Return),
            other => Err(DomainError::validation(format!(
                "'{other}' is not a transaction kind (expected buy, sell or return)"
            ))),
        }
    }
}

/// One line of a transaction: a good and how many units of it changed
/// hands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub good_id: GoodId,
    pub quantity: u32,
}

/// A committed buy or sell event.
///
/// `total_import` is the sum of unit value times quantity captured at
/// creation time; it is never recomputed when prices change later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    id: TransactionId,
    date: DateTime<Utc>,
    kind: TransactionKind,
    party: PartyRef,
    party_name: String,
    line_items: Vec<LineItem>,
    amount: u32,
    total_import: u64,
}

impl Transaction {
    pub fn new(
        id: TransactionId,
        date: DateTime<Utc>,
        kind: TransactionKind,
        party: PartyRef,
        party_name: impl Into<String>,
        line_items: Vec<LineItem>,
        amount: u32,
        total_import: u64,
    ) -> DomainResult<Self> {
        if line_items.is_empty() {
            return Err(DomainError::validation("line items cannot be empty"));
        }
        if line_items.iter().any(|item| item.quantity == 0) {
            return Err(DomainError::validation(
                "line item quantity must be at least 1",
            ));
        }

        Ok(Self {
            id,
            date,
            kind,
            party,
            party_name: party_name.into(),
            line_items,
            amount,
            total_import,
        })
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn party(&self) -> PartyRef {
        self.party
    }

    pub fn party_name(&self) -> &str {
        &self.party_name
    }

    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    pub fn amount(&self) -> u32 {
        self.amount
    }

    pub fn total_import(&self) -> u64 {
        self.total_import
    }

    /// Replace the line items and their derived aggregates (update flow).
    /// Kind and party reference are deliberately not touched.
    pub fn replace_line_items(
        &mut self,
        line_items: Vec<LineItem>,
        amount: u32,
        total_import: u64,
    ) -> DomainResult<()> {
        if line_items.is_empty() {
            return Err(DomainError::validation("line items cannot be empty"));
        }
        if line_items.iter().any(|item| item.quantity == 0) {
            return Err(DomainError::validation(
                "line item quantity must be at least 1",
            ));
        }
        self.line_items = line_items;
        self.amount = amount;
        self.total_import = total_import;
        Ok(())
    }

    pub fn set_date(&mut self, date: DateTime<Utc>) {
        self.date = date;
    }
}

impl Entity for Transaction {
    type Id = TransactionId;

    fn id(&self) -> TransactionId {
        self.id
    }
}
