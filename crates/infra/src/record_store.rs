use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use thiserror::Error;

use tradepost_core::{Entity, Named};

/// Store-level failure.
///
/// The in-memory store can only fail on a poisoned lock; persistent
/// implementations would add their own variants here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Keyed record store abstraction over a single collection.
///
/// Offers plain CRUD plus predicate search. No multi-document transaction
/// primitive is assumed; per-record write serialization is the only
/// concurrency control the domain relies on.
pub trait RecordStore<T: Entity>: Send + Sync {
    fn get(&self, id: &T::Id) -> StoreResult<Option<T>>;
    fn upsert(&self, record: T) -> StoreResult<()>;
    fn remove(&self, id: &T::Id) -> StoreResult<Option<T>>;
    fn find(&self, predicate: &dyn Fn(&T) -> bool) -> StoreResult<Vec<T>>;
    fn len(&self) -> StoreResult<usize>;

    fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Look up a record by its unique display name.
    fn find_by_name(&self, name: &str) -> StoreResult<Option<T>>
    where
        T: Named,
    {
        Ok(self.find(&|r: &T| r.name() == name)?.into_iter().next())
    }
}

impl<T, S> RecordStore<T> for Arc<S>
where
    T: Entity,
    S: RecordStore<T> + ?Sized,
{
    fn get(&self, id: &T::Id) -> StoreResult<Option<T>> {
        (**self).get(id)
    }

    fn upsert(&self, record: T) -> StoreResult<()> {
        (**self).upsert(record)
    }

    fn remove(&self, id: &T::Id) -> StoreResult<Option<T>> {
        (**self).remove(id)
    }

    fn find(&self, predicate: &dyn Fn(&T) -> bool) -> StoreResult<Vec<T>> {
        (**self).find(predicate)
    }

    fn len(&self) -> StoreResult<usize> {
        (**self).len()
    }
}

/// In-memory record store.
///
/// Intended for tests/dev and as the default collaborator. Not optimized
/// for performance.
#[derive(Debug)]
pub struct InMemoryStore<T: Entity> {
    inner: RwLock<HashMap<T::Id, T>>,
}

impl<T: Entity> InMemoryStore<T> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl<T: Entity> Default for InMemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("lock poisoned".to_string())
}

impl<T> RecordStore<T> for InMemoryStore<T>
where
    T: Entity + Clone + Send + Sync + 'static,
    T::Id: Send + Sync,
{
    fn get(&self, id: &T::Id) -> StoreResult<Option<T>> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(id).cloned())
    }

    fn upsert(&self, record: T) -> StoreResult<()> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        map.insert(record.id(), record);
        Ok(())
    }

    fn remove(&self, id: &T::Id) -> StoreResult<Option<T>> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        Ok(map.remove(id))
    }

    fn find(&self, predicate: &dyn Fn(&T) -> bool) -> StoreResult<Vec<T>> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.values().filter(|r| predicate(r)).cloned().collect())
    }

    fn len(&self) -> StoreResult<usize> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.len())
    }
}
