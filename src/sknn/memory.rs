use std::collections::BinaryHeap;

use dary_heap::OctonaryHeap;
use hashbrown::{HashMap, HashSet};

use crate::io::{ItemId, SessionId, Time};
use crate::sknn::index::{PreconditionError, TrainingIndex};
use crate::sknn::state::PredictionSessionState;
use crate::sknn::{SessionScore, SessionTime, SimilarityComputation, MAX_DECAY_STEPS};

/// Hash-map realization of the scoring contract. The production default.
#[derive(Default)]
pub struct MemoryEngine {
    index: TrainingIndex,
}

impl MemoryEngine {
    pub fn from_index(index: TrainingIndex) -> Self {
        MemoryEngine { index }
    }

    pub fn index(&self) -> &TrainingIndex {
        &self.index
    }

    /// Candidate sessions for the current call: the accumulated union of
    /// historical sessions sharing any evolving item, down-sampled to the
    /// `m` most recent ones when it overflows.
    fn possible_neighbor_sessions(
        &self,
        state: &mut PredictionSessionState,
        m: usize,
    ) -> Vec<SessionId> {
        // normally exactly one pending item per call; a state rebuilt from a
        // stored history folds its whole backlog in here
        let pending: Vec<ItemId> = state.pending_union_items().to_vec();
        for item_id in pending {
            if let Some(sessions) = self.index.sessions_for_item(&item_id) {
                state.extend_relevant_sessions(sessions.iter().copied());
            }
        }
        state.mark_union_applied();

        if state.relevant_sessions().len() <= m {
            return state.relevant_sessions().iter().copied().collect();
        }
        self.most_recent_sessions(state.relevant_sessions(), m)
    }

    fn most_recent_sessions(
        &self,
        sessions: &HashSet<SessionId>,
        number: usize,
    ) -> Vec<SessionId> {
        let mut heap_timestamps = OctonaryHeap::<SessionTime>::with_capacity(number);
        for session_id in sessions.iter() {
            let session_time =
                SessionTime::new(*session_id, self.index.max_time_for_session(session_id));
            if heap_timestamps.len() < number {
                heap_timestamps.push(session_time);
            } else {
                let mut bottom = heap_timestamps.peek_mut().unwrap();
                if session_time < *bottom {
                    // evict the oldest sampled session
                    *bottom = session_time;
                }
            }
        }
        heap_timestamps
            .into_iter()
            .map(|session_time| session_time.session_id)
            .collect()
    }

    /// Positional-weighted similarity against every candidate, keeping the
    /// top `k` scored neighbors. Returns the heap together with the distinct
    /// evolving item count it was computed under.
    fn closest_neighbors(
        &self,
        evolving_items: &[ItemId],
        candidates: &[SessionId],
        k: usize,
    ) -> (BinaryHeap<SessionScore>, usize) {
        let mut pos_map: HashMap<ItemId, f64> = HashMap::with_capacity(evolving_items.len());
        let mut distinct_in_order: Vec<ItemId> = Vec::with_capacity(evolving_items.len());
        for item_id in evolving_items.iter() {
            if pos_map.insert(*item_id, 0.0).is_none() {
                distinct_in_order.push(*item_id);
            }
        }
        let qty_distinct_items = distinct_in_order.len();

        // later occurrences overwrite earlier ones with a weight closer to 1
        let mut count = 0_usize;
        for item_id in evolving_items.iter() {
            count += 1;
            pos_map.insert(*item_id, count as f64 / qty_distinct_items as f64);
        }

        let mut closest_neighbors: BinaryHeap<SessionScore> = BinaryHeap::with_capacity(k);
        for session_id in candidates.iter() {
            let neighbor_items = self.index.items_for_session(session_id);

            // weighted-indicator dot product, summed in first-occurrence
            // order so repeated runs accumulate byte-identically
            let mut similarity = 0_f64;
            for item_id in distinct_in_order.iter() {
                if neighbor_items.contains(item_id) {
                    similarity += pos_map[item_id];
                }
            }

            if similarity > 0.0 {
                let scored_session = SessionScore::new(*session_id, similarity);
                if closest_neighbors.len() < k {
                    closest_neighbors.push(scored_session);
                } else {
                    let mut bottom = closest_neighbors.peek_mut().unwrap();
                    if scored_session < *bottom {
                        *bottom = scored_session;
                    }
                }
            }
        }

        (closest_neighbors, qty_distinct_items)
    }

    /// Recency-decayed, idf-weighted accumulation over the items of each
    /// scored neighbor session.
    fn score_items(
        &self,
        evolving_items: &[ItemId],
        neighbors: BinaryHeap<SessionScore>,
        qty_distinct_items: usize,
    ) -> HashMap<ItemId, f64> {
        let mut item_scores: HashMap<ItemId, f64> = HashMap::with_capacity(1000);

        // similarity descending, session id ascending: a fixed accumulation
        // order keeps the float sums reproducible
        for scored_session in neighbors.into_sorted_vec() {
            // a growing evolving session proportionally discounts every neighbor
            let session_score = scored_session.score / qty_distinct_items as f64;

            let neighbor_items = self.index.items_for_session(&scored_session.id);

            let mut step = 0_usize;
            let mut match_found = false;
            for item_id in evolving_items.iter().rev() {
                step += 1;
                if neighbor_items.contains(item_id) {
                    match_found = true;
                    break;
                }
            }
            if !match_found || step > MAX_DECAY_STEPS {
                continue;
            }

            let decayed_session_score = session_score * (1.0 - 0.1 * step as f64);
            for item_id in neighbor_items.iter() {
                *item_scores.entry(*item_id).or_insert(0.0) +=
                    decayed_session_score * self.index.idf(item_id);
            }
        }

        item_scores
    }
}

impl SimilarityComputation for MemoryEngine {
    fn fit(
        rows: &[(SessionId, ItemId, Time)],
        idf_weight: f64,
    ) -> Result<Self, PreconditionError> {
        Ok(MemoryEngine {
            index: TrainingIndex::build(rows, idf_weight)?,
        })
    }

    fn item_scores(
        &self,
        state: &mut PredictionSessionState,
        k: usize,
        m: usize,
    ) -> HashMap<ItemId, f64> {
        let candidates = self.possible_neighbor_sessions(state, m);
        let (neighbors, qty_distinct_items) =
            self.closest_neighbors(state.evolving_items(), &candidates, k);
        self.score_items(state.evolving_items(), neighbors, qty_distinct_items)
    }

    fn catalog(&self) -> &[ItemId] {
        self.index.catalog()
    }
}
