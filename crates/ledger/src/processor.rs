//! Transaction processing: request validation, name resolution, total
//! computation, and the create/update/delete flows around the reconciler.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use thiserror::Error;

use tradepost_core::{DomainError, Entity, TransactionId};
use tradepost_goods::{Good, MAX_STOCK};
use tradepost_infra::{RecordStore, StoreError};
use tradepost_parties::{Hunter, Merchant, PartyKind, PartyRef};

use crate::reconciler::{reconcile_stock, StockError};
use crate::transaction::{LineItem, Transaction, TransactionKind};

/// Failure of a transaction operation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TxError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("no party named '{0}'")]
    PartyNotFound(String),

    #[error("no good named '{0}'")]
    GoodNotFound(String),

    #[error("transaction not found")]
    NotFound,

    #[error("insufficient stock for good '{0}'")]
    InsufficientStock(String),

    #[error("stock for good '{0}' would exceed the allowed maximum")]
    StockOverflow(String),

    #[error("could not revert original stock effect: {0}")]
    RevertFailed(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl TxError {
    fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }
}

impl From<StockError> for TxError {
    fn from(err: StockError) -> Self {
        match err {
            StockError::GoodNotFound(id) => TxError::GoodNotFound(id.to_string()),
            StockError::InsufficientStock(name) => TxError::InsufficientStock(name),
            StockError::StockOverflow(name) => TxError::StockOverflow(name),
            StockError::Store(e) => TxError::Internal(e.to_string()),
        }
    }
}

impl From<StoreError> for TxError {
    fn from(err: StoreError) -> Self {
        TxError::Internal(err.to_string())
    }
}

impl From<DomainError> for TxError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound => TxError::NotFound,
            other => TxError::BadRequest(other.to_string()),
        }
    }
}

/// Requested line item, referencing a good by its unique name.
#[derive(Debug, Clone, Deserialize)]
pub struct NewLineItem {
    pub good_name: String,
    pub quantity: u32,
}

/// Validated-at-the-edge request to record a transaction.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub kind: TransactionKind,
    pub party_name: String,
    pub line_items: Vec<NewLineItem>,
    /// Defaults to the current time when absent.
    pub date: Option<DateTime<Utc>>,
}

/// Filter over the transaction collection (list and bulk-delete).
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub kind: Option<TransactionKind>,
    pub party_kind: Option<PartyKind>,
    pub party_name: Option<String>,
    /// Matches any transaction dated within this UTC calendar day.
    pub day: Option<NaiveDate>,
}

impl TransactionFilter {
    pub fn matches(&self, tx: &Transaction) -> bool {
        if let Some(kind) = self.kind {
            if tx.kind() != kind {
                return false;
            }
        }
        if let Some(party_kind) = self.party_kind {
            if tx.party().kind() != party_kind {
                return false;
            }
        }
        if let Some(name) = &self.party_name {
            if tx.party_name() != name {
                return false;
            }
        }
        if let Some(day) = self.day {
            if tx.date().date_naive() != day {
                return false;
            }
        }
        true
    }
}

/// Core transaction logic over the four record stores.
pub struct TransactionProcessor<G, H, M, T>
where
    G: RecordStore<Good>,
    H: RecordStore<Hunter>,
    M: RecordStore<Merchant>,
    T: RecordStore<Transaction>,
{
    goods: G,
    hunters: H,
    merchants: M,
    transactions: T,
}

impl<G, H, M, T> TransactionProcessor<G, H, M, T>
where
    G: RecordStore<Good>,
    H: RecordStore<Hunter>,
    M: RecordStore<Merchant>,
    T: RecordStore<Transaction>,
{
    pub fn new(goods: G, hunters: H, merchants: M, transactions: T) -> Self {
        Self {
            goods,
            hunters,
            merchants,
            transactions,
        }
    }

    /// Validate, resolve, reconcile and persist a new transaction.
    pub fn create(&self, req: NewTransaction) -> Result<Transaction, TxError> {
        if req.party_name.trim().is_empty() {
            return Err(TxError::bad_request("party name is required"));
        }
        if req.line_items.is_empty() {
            return Err(TxError::bad_request("at least one line item is required"));
        }

        let party = self.resolve_party(req.kind, &req.party_name)?;
        let (line_items, amount, total_import) = self.resolve_line_items(&req.line_items)?;

        reconcile_stock(&self.goods, &line_items, req.kind)?;

        let tx = Transaction::new(
            TransactionId::new(),
            req.date.unwrap_or_else(Utc::now),
            req.kind,
            party,
            req.party_name,
            line_items,
            amount,
            total_import,
        )?;
        self.transactions.upsert(tx.clone())?;

        tracing::info!(
            id = %tx.id(),
            kind = tx.kind().as_str(),
            party = tx.party_name(),
            amount = tx.amount(),
            total_import = tx.total_import(),
            "transaction recorded"
        );
        Ok(tx)
    }

    /// Replace a transaction's line items (and optionally its date).
    ///
    /// The original stock effect is reversed first, then the new items are
    /// applied under the original kind. If the forward step fails after a
    /// committed revert, the original items are re-applied so stock is
    /// left consistent with the unchanged record.
    pub fn update(
        &self,
        id: TransactionId,
        new_line_items: Vec<NewLineItem>,
        new_date: Option<DateTime<Utc>>,
    ) -> Result<Transaction, TxError> {
        let mut tx = self.transactions.get(&id)?.ok_or(TxError::NotFound)?;

        if new_line_items.is_empty() {
            return Err(TxError::bad_request("at least one line item is required"));
        }
        // Resolve before mutating anything: a bad good name must not leave
        // the original effect reverted.
        let (line_items, amount, total_import) = self.resolve_line_items(&new_line_items)?;

        reconcile_stock(&self.goods, tx.line_items(), tx.kind().inverse())
            .map_err(|e| TxError::RevertFailed(e.to_string()))?;

        if let Err(apply_err) = reconcile_stock(&self.goods, &line_items, tx.kind()) {
            // Compensate: put the original effect back before surfacing.
            if let Err(comp_err) = reconcile_stock(&self.goods, tx.line_items(), tx.kind()) {
                return Err(TxError::Internal(format!(
                    "stock left reverted after failed update ({apply_err}); compensation failed: {comp_err}"
                )));
            }
            return Err(apply_err.into());
        }

        tx.replace_line_items(line_items, amount, total_import)?;
        if let Some(date) = new_date {
            tx.set_date(date);
        }
        self.transactions.upsert(tx.clone())?;

        tracing::info!(id = %tx.id(), amount = tx.amount(), "transaction updated");
        Ok(tx)
    }

    /// Reverse a transaction's stock effect and delete the record.
    pub fn delete(&self, id: TransactionId) -> Result<Transaction, TxError> {
        let tx = self.transactions.get(&id)?.ok_or(TxError::NotFound)?;

        reconcile_stock(&self.goods, tx.line_items(), tx.kind().inverse())
            .map_err(|e| TxError::RevertFailed(e.to_string()))?;
        self.transactions.remove(&id)?;

        tracing::info!(id = %tx.id(), kind = tx.kind().as_str(), "transaction deleted");
        Ok(tx)
    }

    /// Delete every transaction matching the filter, reversing each stock
    /// effect. Returns the number of records deleted.
    pub fn delete_by_filter(&self, filter: &TransactionFilter) -> Result<usize, TxError> {
        let matching = self
            .transactions
            .find(&|tx: &Transaction| filter.matches(tx))?;
        if matching.is_empty() {
            return Err(TxError::NotFound);
        }

        let mut deleted = 0;
        for tx in matching {
            reconcile_stock(&self.goods, tx.line_items(), tx.kind().inverse())
                .map_err(|e| TxError::RevertFailed(e.to_string()))?;
            self.transactions.remove(&tx.id())?;
            deleted += 1;
        }

        tracing::info!(deleted, "transactions deleted by filter");
        Ok(deleted)
    }

    pub fn get(&self, id: TransactionId) -> Result<Transaction, TxError> {
        self.transactions.get(&id)?.ok_or(TxError::NotFound)
    }

    /// List matching transactions, oldest first.
    pub fn list(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>, TxError> {
        let mut matching = self
            .transactions
            .find(&|tx: &Transaction| filter.matches(tx))?;
        matching.sort_by_key(|tx| tx.date());
        Ok(matching)
    }

    /// Buys are made by hunters; sells (and returns) go through merchants.
    fn resolve_party(&self, kind: TransactionKind, name: &str) -> Result<PartyRef, TxError> {
        match kind {
            TransactionKind::Buy => self
                .hunters
                .find_by_name(name)?
                .map(|h| PartyRef::Hunter(h.id()))
                .ok_or_else(|| TxError::PartyNotFound(name.to_string())),
            TransactionKind::Sell | TransactionKind::Return => self
                .merchants
                .find_by_name(name)?
                .map(|m| PartyRef::Merchant(m.id()))
                .ok_or_else(|| TxError::PartyNotFound(name.to_string())),
        }
    }

    /// Resolve requested items by good name and compute the aggregates.
    ///
    /// Quantities above [`MAX_STOCK`] can never reconcile, so they are
    /// rejected here; the aggregates still accumulate with checked
    /// arithmetic so hostile totals surface as errors, not overflow.
    fn resolve_line_items(
        &self,
        requested: &[NewLineItem],
    ) -> Result<(Vec<LineItem>, u32, u64), TxError> {
        let mut line_items = Vec::with_capacity(requested.len());
        let mut amount: u32 = 0;
        let mut total_import: u64 = 0;

        for item in requested {
            if item.good_name.trim().is_empty() {
                return Err(TxError::bad_request("line item good name is required"));
            }
            if item.quantity == 0 {
                return Err(TxError::bad_request(
                    "line item quantity must be a positive number",
                ));
            }
            if item.quantity > MAX_STOCK {
                return Err(TxError::bad_request(format!(
                    "line item quantity cannot exceed {MAX_STOCK}"
                )));
            }
            let good = self
                .goods
                .find_by_name(&item.good_name)?
                .ok_or_else(|| TxError::GoodNotFound(item.good_name.clone()))?;

            amount = amount
                .checked_add(item.quantity)
                .ok_or_else(|| TxError::bad_request("total quantity is too large"))?;
            total_import = u64::from(good.unit_value())
                .checked_mul(u64::from(item.quantity))
                .and_then(|line_total| total_import.checked_add(line_total))
                .ok_or_else(|| TxError::bad_request("total value is too large"))?;
            line_items.push(LineItem {
                good_id: good.id(),
                quantity: item.quantity,
            });
        }

        Ok((line_items, amount, total_import))
    }
}
