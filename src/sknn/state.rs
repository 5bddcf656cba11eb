use hashbrown::HashSet;

use crate::io::{ItemId, SessionId};

/// Mutable scan state of one evolving session. Owned by the caller side
/// (the predictor keys these by session id); calls for the same session
/// must be applied strictly in arrival order.
#[derive(Debug)]
pub struct PredictionSessionState {
    session_id: SessionId,
    evolving_items: Vec<ItemId>,
    relevant_sessions: HashSet<SessionId>,
    // number of evolving items whose historical sessions have already been
    // folded into relevant_sessions
    union_cursor: usize,
}

impl PredictionSessionState {
    pub fn new(session_id: SessionId) -> Self {
        PredictionSessionState {
            session_id,
            evolving_items: Vec::new(),
            relevant_sessions: HashSet::new(),
            union_cursor: 0,
        }
    }

    /// Rebuilds the state of a session from its stored interaction history,
    /// e.g. when the items are kept in an external session store.
    pub fn from_items(session_id: SessionId, items: &[ItemId]) -> Self {
        let mut state = PredictionSessionState::new(session_id);
        for item_id in items {
            state.append_item(*item_id);
        }
        state
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Append-only; duplicates are expected when a user revisits an item.
    pub fn append_item(&mut self, item_id: ItemId) {
        self.evolving_items.push(item_id);
    }

    pub fn evolving_items(&self) -> &[ItemId] {
        &self.evolving_items
    }

    /// Items appended since the candidate union was last brought up to date.
    pub fn pending_union_items(&self) -> &[ItemId] {
        &self.evolving_items[self.union_cursor..]
    }

    pub fn mark_union_applied(&mut self) {
        self.union_cursor = self.evolving_items.len();
    }

    /// Grows the accumulated candidate set. The union never shrinks within
    /// a session.
    pub fn extend_relevant_sessions(&mut self, sessions: impl IntoIterator<Item = SessionId>) {
        self.relevant_sessions.extend(sessions);
    }

    pub fn relevant_sessions(&self) -> &HashSet<SessionId> {
        &self.relevant_sessions
    }
}

#[cfg(test)]
mod session_state_test {
    use super::*;

    #[test]
    fn should_keep_duplicate_items_in_order() {
        let mut state = PredictionSessionState::new(42);
        state.append_item(7);
        state.append_item(8);
        state.append_item(7);
        assert_eq!(&[7, 8, 7], state.evolving_items());
    }

    #[test]
    fn should_grow_relevant_sessions_monotonically() {
        let mut state = PredictionSessionState::new(42);
        state.extend_relevant_sessions(vec![1, 2]);
        state.extend_relevant_sessions(vec![2, 3]);
        assert_eq!(3, state.relevant_sessions().len());
    }

    #[test]
    fn should_track_items_pending_candidate_union() {
        let mut state = PredictionSessionState::from_items(42, &[7, 8]);
        assert_eq!(&[7, 8], state.pending_union_items());
        state.mark_union_applied();
        state.append_item(9);
        assert_eq!(&[9], state.pending_union_items());
    }
}
