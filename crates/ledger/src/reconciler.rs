//! Stock reconciliation: applying a transaction's stock deltas to goods.
//!
//! Reconciliation is a unit of work: every referenced good is loaded and
//! every resulting stock level is validated before anything is written, so
//! a failed reconcile never leaves a partial mutation behind.

use std::collections::HashMap;

use thiserror::Error;

use tradepost_core::{GoodId, Named};
use tradepost_goods::{Good, MAX_STOCK};
use tradepost_infra::{RecordStore, StoreError};

use crate::transaction::{LineItem, TransactionKind};

/// Failure while reconciling stock levels.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StockError {
    #[error("good {0} not found")]
    GoodNotFound(GoodId),

    #[error("insufficient stock for good '{0}'")]
    InsufficientStock(String),

    #[error("stock for good '{0}' would exceed {MAX_STOCK}")]
    StockOverflow(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Apply the stock effect of `items` under `kind` to the good store.
///
/// All deltas are validated against current stock before any good is
/// persisted; on error nothing has been written. Repeated references to
/// the same good accumulate.
pub fn reconcile_stock(
    goods: &dyn RecordStore<Good>,
    items: &[LineItem],
    kind: TransactionKind,
) -> Result<(), StockError> {
    // Phase 1: load and validate every resulting level.
    let mut staged: HashMap<GoodId, Good> = HashMap::new();

    for item in items {
        if !staged.contains_key(&item.good_id) {
            let good = goods
                .get(&item.good_id)?
                .ok_or(StockError::GoodNotFound(item.good_id))?;
            staged.insert(item.good_id, good);
        }
        let good = staged
            .get_mut(&item.good_id)
            .ok_or(StockError::GoodNotFound(item.good_id))?;

        let new_stock = i64::from(good.stock()) + kind.signed_delta(item.quantity);
        if new_stock < 0 {
            return Err(StockError::InsufficientStock(good.name().to_string()));
        }
        if new_stock > i64::from(MAX_STOCK) {
            return Err(StockError::StockOverflow(good.name().to_string()));
        }

        // In range, so the cast and the invariant check cannot fail.
        good.set_stock(new_stock as u32)
            .map_err(|_| StockError::StockOverflow(good.name().to_string()))?;
    }

    // Phase 2: commit all updated goods.
    for good in staged.into_values() {
        tracing::debug!(
            good = %good.name(),
            stock = good.stock(),
            kind = kind.as_str(),
            "stock reconciled"
        );
        goods.upsert(good)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tradepost_goods::Material;
    use tradepost_infra::InMemoryStore;

    fn seed(store: &InMemoryStore<Good>, name: &str, value: u32, stock: u32) -> GoodId {
        let id = GoodId::new();
        let good = Good::new(id, name, "test good", Material::Steel, 1.0, value, stock).unwrap();
        store.upsert(good).unwrap();
        id
    }

    fn stock_of(store: &InMemoryStore<Good>, id: GoodId) -> u32 {
        store.get(&id).unwrap().unwrap().stock()
    }

    #[test]
    fn buy_decreases_each_referenced_good() {
        let store = InMemoryStore::new();
        let a = seed(&store, "SwordA", 100, 10);
        let b = seed(&store, "SwordB", 50, 5);

        let items = vec![
            LineItem { good_id: a, quantity: 2 },
            LineItem { good_id: b, quantity: 1 },
        ];
        reconcile_stock(&store, &items, TransactionKind::Buy).unwrap();

        assert_eq!(stock_of(&store, a), 8);
        assert_eq!(stock_of(&store, b), 4);
    }

    #[test]
    fn sell_and_return_increase_stock() {
        let store = InMemoryStore::new();
        let a = seed(&store, "Potion", 10, 3);

        let items = vec![LineItem { good_id: a, quantity: 4 }];
        reconcile_stock(&store, &items, TransactionKind::Sell).unwrap();
        assert_eq!(stock_of(&store, a), 7);

        reconcile_stock(&store, &items, TransactionKind::Return).unwrap();
        assert_eq!(stock_of(&store, a), 11);
    }

    #[test]
    fn insufficient_stock_leaves_every_good_untouched() {
        let store = InMemoryStore::new();
        let a = seed(&store, "SwordA", 100, 10);
        let b = seed(&store, "SwordB", 50, 1);

        // The first item would succeed on its own; the second cannot.
        let items = vec![
            LineItem { good_id: a, quantity: 2 },
            LineItem { good_id: b, quantity: 5 },
        ];
        let err = reconcile_stock(&store, &items, TransactionKind::Buy).unwrap_err();
        assert_eq!(err, StockError::InsufficientStock("SwordB".to_string()));

        assert_eq!(stock_of(&store, a), 10);
        assert_eq!(stock_of(&store, b), 1);
    }

    #[test]
    fn overflow_past_max_stock_is_rejected() {
        let store = InMemoryStore::new();
        let a = seed(&store, "Potion", 10, MAX_STOCK - 1);

        let items = vec![LineItem { good_id: a, quantity: 2 }];
        let err = reconcile_stock(&store, &items, TransactionKind::Sell).unwrap_err();
        assert_eq!(err, StockError::StockOverflow("Potion".to_string()));
        assert_eq!(stock_of(&store, a), MAX_STOCK - 1);
    }

    #[test]
    fn unknown_good_fails_the_whole_batch() {
        let store = InMemoryStore::new();
        let a = seed(&store, "SwordA", 100, 10);

        let items = vec![
            LineItem { good_id: a, quantity: 1 },
            LineItem { good_id: GoodId::new(), quantity: 1 },
        ];
        let err = reconcile_stock(&store, &items, TransactionKind::Buy).unwrap_err();
        assert!(matches!(err, StockError::GoodNotFound(_)));
        assert_eq!(stock_of(&store, a), 10);
    }

    proptest::proptest! {
        #![proptest_config(proptest::prelude::ProptestConfig {
            cases: 256,
            ..proptest::prelude::ProptestConfig::default()
        })]

        /// Property: no sequence of reconcile calls ever leaves stock
        /// outside 0..=MAX_STOCK, whether the call succeeded or failed.
        #[test]
        fn stock_stays_in_range_under_random_operations(
            initial in 0u32..=MAX_STOCK,
            ops in proptest::collection::vec((0u8..3, 1u32..50), 1..40)
        ) {
            let store = InMemoryStore::new();
            let id = seed(&store, "Widget", 10, initial);

            for (kind_tag, quantity) in ops {
                let kind = match kind_tag {
                    0 => TransactionKind::Buy,
                    1 => TransactionKind::Sell,
                    _ => TransactionKind::Return,
                };
                let items = vec![LineItem { good_id: id, quantity }];
                let _ = reconcile_stock(&store, &items, kind);

                let stock = stock_of(&store, id);
                proptest::prop_assert!(stock <= MAX_STOCK);
            }
        }
    }

    #[test]
    fn duplicate_line_items_accumulate_on_one_good() {
        let store = InMemoryStore::new();
        let a = seed(&store, "SwordA", 100, 10);

        let items = vec![
            LineItem { good_id: a, quantity: 4 },
            LineItem { good_id: a, quantity: 4 },
        ];
        reconcile_stock(&store, &items, TransactionKind::Buy).unwrap();
        assert_eq!(stock_of(&store, a), 2);

        // A third pair would drive it to -6 in total even though each line
        // alone fits: the accumulated check has to catch it.
        let items = vec![
            LineItem { good_id: a, quantity: 4 },
            LineItem { good_id: a, quantity: 4 },
        ];
        let err = reconcile_stock(&store, &items, TransactionKind::Buy).unwrap_err();
        assert!(matches!(err, StockError::InsufficientStock(_)));
        assert_eq!(stock_of(&store, a), 2);
    }
}
