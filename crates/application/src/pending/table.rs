use super::query::PendingQuery;
use ferrous_frontend_domain::{DomainError, QueryId};
use rustc_hash::FxHashMap;

/// Supplies candidate query ids.
pub trait IdSource: Send {
    fn next_id(&mut self) -> u64;
}

pub struct RandomIdSource {
    rng: fastrand::Rng,
}

impl RandomIdSource {
    pub fn new() -> Self {
        Self {
            rng: fastrand::Rng::new(),
        }
    }
}

impl Default for RandomIdSource {
    fn default() -> Self {
        Self::new()
    }
}

impl IdSource for RandomIdSource {
    fn next_id(&mut self) -> u64 {
        self.rng.u64(..)
    }
}

/// In-flight queries keyed by id. Removing an entry releases everything it owns.
pub struct PendingQueryTable<C> {
    queries: FxHashMap<QueryId, PendingQuery<C>>,
    ids: Box<dyn IdSource>,
}

impl<C> PendingQueryTable<C> {
    pub fn new() -> Self {
        Self::with_id_source(Box::new(RandomIdSource::new()))
    }

    pub fn with_id_source(ids: Box<dyn IdSource>) -> Self {
        Self {
            queries: FxHashMap::default(),
            ids,
        }
    }

    /// Draws ids until one is not in use.
    pub fn allocate_id(&mut self) -> QueryId {
        loop {
            let id = QueryId::new(self.ids.next_id());
            if !self.queries.contains_key(&id) {
                return id;
            }
        }
    }

    pub fn insert(&mut self, query: PendingQuery<C>) -> Result<(), DomainError> {
        if self.queries.contains_key(&query.id) {
            return Err(DomainError::DuplicateQueryId(query.id.to_string()));
        }
        self.queries.insert(query.id, query);
        Ok(())
    }

    pub fn find(&self, id: QueryId) -> Option<&PendingQuery<C>> {
        self.queries.get(&id)
    }

    pub fn find_mut(&mut self, id: QueryId) -> Option<&mut PendingQuery<C>> {
        self.queries.get_mut(&id)
    }

    pub fn remove(&mut self, id: QueryId) -> Option<PendingQuery<C>> {
        self.queries.remove(&id)
    }

    pub fn contains(&self, id: QueryId) -> bool {
        self.queries.contains_key(&id)
    }

    pub fn count(&self) -> usize {
        self.queries.len()
    }
}

impl<C> Default for PendingQueryTable<C> {
    fn default() -> Self {
        Self::new()
    }
}
