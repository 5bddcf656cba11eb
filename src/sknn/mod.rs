use std::cmp::Ordering;

use hashbrown::HashMap;

use crate::io::{ItemId, SessionId, Time};
use crate::sknn::index::PreconditionError;
use crate::sknn::score_vector::build_ranked;
use crate::sknn::state::PredictionSessionState;

pub mod index;
pub mod memory;
pub mod predictor;
pub mod relational;
pub mod score_vector;
pub mod state;

/// Furthest position from the end of the evolving session at which a shared
/// item still lets a neighbor session contribute. A hard cutoff, not a
/// clamp: the linear decay factor goes negative past step 10 and stays in
/// effect until here.
pub(crate) const MAX_DECAY_STEPS: usize = 100;

/// A historical session scored against the evolving session.
#[derive(PartialEq, Debug)]
pub struct SessionScore {
    pub id: SessionId,
    pub score: f64,
}

impl SessionScore {
    fn new(id: SessionId, score: f64) -> Self {
        SessionScore { id, score }
    }
}

impl Eq for SessionScore {}

impl Ord for SessionScore {
    fn cmp(&self, other: &Self) -> Ordering {
        // reverse order by score so a max-heap exposes the weakest neighbor,
        // equal scores resolved on ascending session_id for reproducibility
        match self.score.partial_cmp(&other.score) {
            Some(Ordering::Less) => Ordering::Greater,
            Some(Ordering::Greater) => Ordering::Less,
            _ => self.id.cmp(&other.id),
        }
    }
}

impl PartialOrd for SessionScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A catalog item with its accumulated prediction score.
#[derive(PartialEq, Debug, Clone)]
pub struct ItemScore {
    pub id: ItemId,
    pub score: f64,
}

impl ItemScore {
    pub fn new(id: ItemId, score: f64) -> Self {
        ItemScore { id, score }
    }
}

impl Eq for ItemScore {}

impl Ord for ItemScore {
    fn cmp(&self, other: &Self) -> Ordering {
        // reverse order by score, equal scores resolved on ascending item id
        match self.score.partial_cmp(&other.score) {
            Some(Ordering::Less) => Ordering::Greater,
            Some(Ordering::Greater) => Ordering::Less,
            _ => self.id.cmp(&other.id),
        }
    }
}

impl PartialOrd for ItemScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(PartialEq, Eq, Debug)]
pub struct SessionTime {
    pub session_id: SessionId,
    pub time: Time,
}

impl SessionTime {
    pub fn new(session_id: SessionId, time: Time) -> Self {
        SessionTime { session_id, time }
    }
}

impl Ord for SessionTime {
    fn cmp(&self, other: &Self) -> Ordering {
        // reverse order by time; among equally recent sessions the larger
        // session_id ranks as older so that eviction keeps ascending ids
        match other.time.cmp(&self.time) {
            Ordering::Equal => self.session_id.cmp(&other.session_id),
            ordering => ordering,
        }
    }
}

impl PartialOrd for SessionTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Contract shared by the interchangeable engine realizations. Given the
/// state of an evolving session, an engine produces the sparse decayed and
/// idf-weighted item scores; `k` bounds the scored neighborhood and `m`
/// bounds the candidate sample.
pub trait SimilarityComputation {
    fn fit(rows: &[(SessionId, ItemId, Time)], idf_weight: f64) -> Result<Self, PreconditionError>
    where
        Self: Sized;

    fn item_scores(
        &self,
        state: &mut PredictionSessionState,
        k: usize,
        m: usize,
    ) -> HashMap<ItemId, f64>;

    fn catalog(&self) -> &[ItemId];
}

/// Ranks the full item catalog for the current state of an evolving session.
/// The most recently appended item is the one the user is looking at and is
/// forced to score zero. Panics if no item has been appended yet.
pub fn predict<E: SimilarityComputation + Send + Sync>(
    engine: &E,
    state: &mut PredictionSessionState,
    k: usize,
    m: usize,
    normalize: bool,
) -> Vec<ItemScore> {
    let input_item_id = *state.evolving_items().last().unwrap();
    let item_scores = engine.item_scores(state, k, m);
    build_ranked(item_scores, engine.catalog(), input_item_id, normalize)
}
