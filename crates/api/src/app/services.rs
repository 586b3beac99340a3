use std::sync::Arc;

use tradepost_goods::Good;
use tradepost_infra::InMemoryStore;
use tradepost_ledger::{Transaction, TransactionProcessor};
use tradepost_parties::{Hunter, Merchant};

/// Transaction processor over the in-memory record stores.
pub type Processor = TransactionProcessor<
    Arc<InMemoryStore<Good>>,
    Arc<InMemoryStore<Hunter>>,
    Arc<InMemoryStore<Merchant>>,
    Arc<InMemoryStore<Transaction>>,
>;

/// Shared application services: one store per collection plus the
/// processor that coordinates them.
pub struct AppServices {
    pub goods: Arc<InMemoryStore<Good>>,
    pub hunters: Arc<InMemoryStore<Hunter>>,
    pub merchants: Arc<InMemoryStore<Merchant>>,
    pub transactions: Arc<InMemoryStore<Transaction>>,
    pub processor: Processor,
}

/// Wire the in-memory record stores and the processor.
///
/// A persistent store implementation would be swapped in here; nothing
/// above this function knows which backing store is in use.
pub fn build_services() -> AppServices {
    let goods = Arc::new(InMemoryStore::new());
    let hunters = Arc::new(InMemoryStore::new());
    let merchants = Arc::new(InMemoryStore::new());
    let transactions = Arc::new(InMemoryStore::new());

    let processor = TransactionProcessor::new(
        goods.clone(),
        hunters.clone(),
        merchants.clone(),
        transactions.clone(),
    );

    AppServices {
        goods,
        hunters,
        merchants,
        transactions,
        processor,
    }
}
