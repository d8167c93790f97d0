use std::sync::Arc;

use callie_domain::agent::{AgentRecord, Mutation};

use crate::projection::{ProjectionCache, Views};

/// What the reducer can do to the canonical record.
#[derive(Debug, Clone)]
pub enum Action {
    Set(Mutation),
    /// Applied in order to a single copy; observers never see a partial batch.
    Batch(Vec<Mutation>),
    /// Full replace, used for hydration.
    Load(AgentRecord),
}

impl From<Mutation> for Action {
    fn from(m: Mutation) -> Self {
        Action::Set(m)
    }
}

/// Produce the next record. `state` is never modified.
pub fn reduce(state: &Arc<AgentRecord>, action: Action) -> Arc<AgentRecord> {
    match action {
        Action::Load(record) => Arc::new(record),
        Action::Set(m) => {
            let mut next = AgentRecord::clone(state);
            m.apply(&mut next);
            Arc::new(next)
        }
        Action::Batch(mutations) => {
            let mut next = AgentRecord::clone(state);
            for m in mutations {
                m.apply(&mut next);
            }
            Arc::new(next)
        }
    }
}

/// Holds the current record and the memoized projections of it.
#[derive(Debug, Default)]
pub struct AgentStore {
    state: Arc<AgentRecord>,
    cache: ProjectionCache,
}

impl AgentStore {
    pub fn new(record: AgentRecord) -> Self {
        Self {
            state: Arc::new(record),
            cache: ProjectionCache::default(),
        }
    }

    pub fn state(&self) -> Arc<AgentRecord> {
        Arc::clone(&self.state)
    }

    pub fn dispatch(&mut self, action: Action) -> Arc<AgentRecord> {
        self.state = reduce(&self.state, action);
        Arc::clone(&self.state)
    }

    /// Projections of the current record, recomputed only when the record
    /// pointer changed since the last call.
    pub fn views(&mut self) -> Arc<Views> {
        self.cache.get(&self.state)
    }
}
