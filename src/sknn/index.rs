use std::error::Error;
use std::fmt;

use hashbrown::{HashMap, HashSet};

use crate::io::{ItemId, SessionId, Time};

/// Violation of the sorted-input contract of `TrainingIndex::build`.
#[derive(Debug)]
pub struct PreconditionError {
    message: String,
}

impl PreconditionError {
    pub fn new(message: impl Into<String>) -> Self {
        PreconditionError {
            message: message.into(),
        }
    }
}

impl fmt::Display for PreconditionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "precondition violated: {}", self.message)
    }
}

impl Error for PreconditionError {}

/// Immutable co-visitation index over the historical training sessions.
/// Built once, then shared read-only between any number of predicting
/// threads without locking.
#[derive(Default)]
pub struct TrainingIndex {
    session_items: HashMap<SessionId, HashSet<ItemId>>,
    item_sessions: HashMap<ItemId, HashSet<SessionId>>,
    session_max_time: HashMap<SessionId, Time>,
    item_idfs: HashMap<ItemId, f64>,
    catalog: Vec<ItemId>,
}

impl TrainingIndex {
    /// Builds the index in a single ascending pass over rows pre-sorted by
    /// (session_id, time). Sorting is the caller's contract: a session id
    /// that reappears after another session was seen, or time running
    /// backwards within a session, aborts the build instead of producing a
    /// mis-grouped index.
    pub fn build(
        rows: &[(SessionId, ItemId, Time)],
        idf_weight: f64,
    ) -> Result<Self, PreconditionError> {
        let mut session_items: HashMap<SessionId, HashSet<ItemId>> = HashMap::new();
        let mut item_sessions: HashMap<ItemId, HashSet<SessionId>> = HashMap::new();
        let mut session_max_time: HashMap<SessionId, Time> = HashMap::new();

        let mut closed_sessions: HashSet<SessionId> = HashSet::new();
        let mut current_run: Option<(SessionId, Time)> = None;

        for &(session_id, item_id, time) in rows {
            match current_run {
                Some((active_session, last_time)) if active_session == session_id => {
                    if time < last_time {
                        return Err(PreconditionError::new(format!(
                            "rows not sorted by (session_id, time): time {} after {} in session {}",
                            time, last_time, session_id
                        )));
                    }
                }
                Some((active_session, _last_time)) => {
                    if closed_sessions.contains(&session_id) {
                        return Err(PreconditionError::new(format!(
                            "rows not sorted by (session_id, time): session {} reappears after session {}",
                            session_id, active_session
                        )));
                    }
                    closed_sessions.insert(active_session);
                }
                None => {}
            }
            current_run = Some((session_id, time));

            session_items
                .entry(session_id)
                .or_insert_with(HashSet::new)
                .insert(item_id);
            item_sessions
                .entry(item_id)
                .or_insert_with(HashSet::new)
                .insert(session_id);
            let max_time = session_max_time.entry(session_id).or_insert(time);
            if time > *max_time {
                *max_time = time;
            }
        }

        let num_sessions = session_items.len();
        let item_idfs: HashMap<ItemId, f64> = item_sessions
            .iter()
            .map(|(item_id, sessions)| (*item_id, idf_weight * idf(num_sessions, sessions.len())))
            .collect();

        let mut catalog: Vec<ItemId> = item_sessions.keys().copied().collect();
        catalog.sort_unstable();

        Ok(TrainingIndex {
            session_items,
            item_sessions,
            session_max_time,
            item_idfs,
            catalog,
        })
    }

    pub fn items_for_session(&self, session_id: &SessionId) -> &HashSet<ItemId> {
        &self.session_items[session_id]
    }

    pub fn sessions_for_item(&self, item_id: &ItemId) -> Option<&HashSet<SessionId>> {
        self.item_sessions.get(item_id)
    }

    pub fn max_time_for_session(&self, session_id: &SessionId) -> Time {
        self.session_max_time[session_id]
    }

    /// Every indexed item has an idf entry; a missing one means the index
    /// is internally inconsistent and there is nothing sensible to return.
    pub fn idf(&self, item_id: &ItemId) -> f64 {
        self.item_idfs[item_id]
    }

    /// All item ids seen in training, ascending. The universe over which
    /// prediction vectors are materialized.
    pub fn catalog(&self) -> &[ItemId] {
        &self.catalog
    }

    pub fn num_sessions(&self) -> usize {
        self.session_items.len()
    }

    pub fn iter_sessions(
        &self,
    ) -> impl Iterator<Item = (SessionId, &HashSet<ItemId>, Time)> + '_ {
        self.session_items
            .iter()
            .map(move |(session_id, items)| (*session_id, items, self.session_max_time[session_id]))
    }
}

pub(crate) fn idf(num_sessions_total: usize, num_sessions_with_item: usize) -> f64 {
    (num_sessions_total as f64 / num_sessions_with_item as f64).ln()
}
