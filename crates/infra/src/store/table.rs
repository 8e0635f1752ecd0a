use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use recon_core::{DomainError, DomainResult, Entity};

pub(crate) fn poisoned<T>(_: PoisonError<T>) -> DomainError {
    DomainError::storage("store lock poisoned")
}

/// `RwLock`-guarded rows keyed by entity id.
#[derive(Debug)]
pub struct Table<E: Entity> {
    rows: RwLock<HashMap<E::Id, E>>,
}

impl<E: Entity> Table<E> {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }
}

impl<E: Entity> Default for Table<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Table<E>
where
    E: Entity + Clone,
{
    pub fn get(&self, id: E::Id) -> DomainResult<Option<E>> {
        let rows = self.rows.read().map_err(poisoned)?;
        Ok(rows.get(&id).cloned())
    }

    /// Insert a row whose id must not exist yet.
    pub fn insert(&self, row: E) -> DomainResult<()> {
        let mut rows = self.rows.write().map_err(poisoned)?;
        let id = row.id();
        if rows.contains_key(&id) {
            return Err(DomainError::conflict(format!("{id:?} already exists")));
        }
        rows.insert(id, row);
        Ok(())
    }

    /// Mutate one row in place under the write lock. `Ok(None)` for an
    /// unknown id.
    pub fn update<R>(
        &self,
        id: E::Id,
        f: impl FnOnce(&mut E) -> DomainResult<R>,
    ) -> DomainResult<Option<R>> {
        let mut rows = self.rows.write().map_err(poisoned)?;
        match rows.get_mut(&id) {
            Some(row) => f(row).map(Some),
            None => Ok(None),
        }
    }

    /// First row matching `pred`, in ascending id order.
    pub fn find(&self, pred: impl Fn(&E) -> bool) -> DomainResult<Option<E>>
    where
        E::Id: Ord,
    {
        let rows = self.rows.read().map_err(poisoned)?;
        Ok(rows
            .values()
            .filter(|row| pred(row))
            .min_by_key(|row| row.id())
            .cloned())
    }

    /// All rows, sorted by id.
    pub fn list(&self) -> DomainResult<Vec<E>>
    where
        E::Id: Ord,
    {
        let rows = self.rows.read().map_err(poisoned)?;
        let mut out: Vec<E> = rows.values().cloned().collect();
        out.sort_by_key(|row| row.id());
        Ok(out)
    }

    pub fn len(&self) -> DomainResult<usize> {
        Ok(self.rows.read().map_err(poisoned)?.len())
    }

    pub fn is_empty(&self) -> DomainResult<bool> {
        Ok(self.len()? == 0)
    }
}
