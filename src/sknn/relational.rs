use std::cmp::Ordering;

use hashbrown::HashMap;
use itertools::Itertools;

use crate::io::{ItemId, SessionId, Time};
use crate::sknn::index::{PreconditionError, TrainingIndex};
use crate::sknn::state::PredictionSessionState;
use crate::sknn::{SimilarityComputation, MAX_DECAY_STEPS};

/// One row of the `historical_sessions` table: a (session, item) pair plus
/// the maximum timestamp observed in that session. Revisits within a
/// session collapse into a single row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HistoricalSessionRow {
    session_id: SessionId,
    item_id: ItemId,
    max_time: Time,
}

/// Declarative realization of the scoring contract: the identical pipeline
/// phrased as scans, joins and grouped aggregations over flat row tables,
/// the way an embedded analytical engine executes it. Must rank exactly
/// like `MemoryEngine` for the same input and configuration.
#[derive(Default)]
pub struct RelationalEngine {
    historical_sessions: Vec<HistoricalSessionRow>,
    // secondary indexes over the table: row offsets keyed by column value
    rows_by_item: HashMap<ItemId, Vec<u32>>,
    rows_by_session: HashMap<SessionId, (u32, u32)>,
    idf: HashMap<ItemId, f64>,
    catalog: Vec<ItemId>,
}

impl RelationalEngine {
    /// Materializes the relational tables from an existing index.
    pub fn derive(index: &TrainingIndex) -> Self {
        let mut historical_sessions: Vec<HistoricalSessionRow> = index
            .iter_sessions()
            .flat_map(|(session_id, items, max_time)| {
                items.iter().map(move |item_id| HistoricalSessionRow {
                    session_id,
                    item_id: *item_id,
                    max_time,
                })
            })
            .collect();
        historical_sessions.sort_unstable_by_key(|row| (row.session_id, row.item_id));

        let mut rows_by_item: HashMap<ItemId, Vec<u32>> = HashMap::new();
        let mut rows_by_session: HashMap<SessionId, (u32, u32)> = HashMap::new();
        for (offset, row) in historical_sessions.iter().enumerate() {
            let offset = offset as u32;
            rows_by_item
                .entry(row.item_id)
                .or_insert_with(Vec::new)
                .push(offset);
            let range = rows_by_session
                .entry(row.session_id)
                .or_insert((offset, offset));
            range.1 = offset + 1;
        }

        let catalog = index.catalog().to_vec();
        let idf = catalog
            .iter()
            .map(|item_id| (*item_id, index.idf(item_id)))
            .collect();

        RelationalEngine {
            historical_sessions,
            rows_by_item,
            rows_by_session,
            idf,
            catalog,
        }
    }

    fn max_time_of(&self, session_id: SessionId) -> Time {
        let (start, _end) = self.rows_by_session[&session_id];
        self.historical_sessions[start as usize].max_time
    }
}

impl SimilarityComputation for RelationalEngine {
    fn fit(
        rows: &[(SessionId, ItemId, Time)],
        idf_weight: f64,
    ) -> Result<Self, PreconditionError> {
        Ok(RelationalEngine::derive(&TrainingIndex::build(rows, idf_weight)?))
    }

    fn item_scores(
        &self,
        state: &mut PredictionSessionState,
        k: usize,
        m: usize,
    ) -> HashMap<ItemId, f64> {
        let evolving_items = state.evolving_items();
        let session_length = evolving_items.len();
        let qty_distinct_items = evolving_items.iter().unique().count();

        // evolving session grouped by item: MAX(pos) keeps the weight of the
        // latest occurrence, MIN(step) its distance from the session end
        let mut grouped_evolving: HashMap<ItemId, (f64, usize)> = HashMap::new();
        for (offset, item_id) in evolving_items.iter().enumerate() {
            let pos = (offset + 1) as f64 / qty_distinct_items as f64;
            let step = session_length - offset;
            let aggregate = grouped_evolving.entry(*item_id).or_insert((pos, step));
            if pos > aggregate.0 {
                aggregate.0 = pos;
            }
            if step < aggregate.1 {
                aggregate.1 = step;
            }
        }
        // ORDER BY item_id for reproducible float accumulation
        let evolving_rows: Vec<(ItemId, f64, usize)> = grouped_evolving
            .into_iter()
            .map(|(item_id, (pos, step))| (item_id, pos, step))
            .sorted_unstable_by_key(|(item_id, _pos, _step)| *item_id)
            .collect();

        // JOIN historical_sessions ON item_id, GROUP BY session_id:
        // SUM(pos) is the similarity, MIN(step) the match distance
        let mut joined: HashMap<SessionId, (f64, usize)> = HashMap::new();
        for (item_id, pos, step) in evolving_rows.iter() {
            if let Some(row_offsets) = self.rows_by_item.get(item_id) {
                for offset in row_offsets.iter() {
                    let row = self.historical_sessions[*offset as usize];
                    let aggregate = joined.entry(row.session_id).or_insert((0.0, *step));
                    aggregate.0 += pos;
                    if *step < aggregate.1 {
                        aggregate.1 = *step;
                    }
                }
            }
        }

        // candidate cap: WHERE session_id IN (the m most recent candidates)
        let mut candidates: Vec<(SessionId, f64, usize)> = joined
            .into_iter()
            .map(|(session_id, (similarity, min_step))| (session_id, similarity, min_step))
            .collect();
        if candidates.len() > m {
            candidates.sort_unstable_by(|a, b| {
                self.max_time_of(b.0)
                    .cmp(&self.max_time_of(a.0))
                    .then_with(|| a.0.cmp(&b.0))
            });
            candidates.truncate(m);
        }

        // ORDER BY similarity DESC, session_id ASC LIMIT k on positive rows
        let mut neighbors: Vec<(SessionId, f64, usize)> = candidates
            .into_iter()
            .filter(|(_session_id, similarity, _min_step)| *similarity > 0.0)
            .collect();
        neighbors.sort_unstable_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        neighbors.truncate(k);

        // HAVING MIN(step) <= 100, then normalize and decay per neighbor
        let mut decayed_rows: Vec<(SessionId, f64)> = Vec::with_capacity(neighbors.len());
        for (session_id, similarity, min_step) in neighbors {
            if min_step > MAX_DECAY_STEPS {
                continue;
            }
            let session_score = similarity / qty_distinct_items as f64;
            let decayed_session_score = session_score * (1.0 - 0.1 * min_step as f64);
            decayed_rows.push((session_id, decayed_session_score));
        }

        // JOIN back ON session_id, GROUP BY item_id: SUM(decayed score)
        let mut summed_scores: HashMap<ItemId, f64> = HashMap::new();
        for (session_id, decayed_session_score) in decayed_rows {
            let (start, end) = self.rows_by_session[&session_id];
            for row in self.historical_sessions[start as usize..end as usize].iter() {
                *summed_scores.entry(row.item_id).or_insert(0.0) += decayed_session_score;
            }
        }

        // final projection: JOIN idf ON item_id
        summed_scores
            .into_iter()
            .map(|(item_id, summed)| (item_id, summed * self.idf[&item_id]))
            .collect()
    }

    fn catalog(&self) -> &[ItemId] {
        &self.catalog
    }
}

#[cfg(test)]
mod relational_engine_test {
    use float_cmp::approx_eq;

    use crate::sknn::memory::MemoryEngine;
    use crate::sknn::predict;

    use super::*;

    fn training_rows() -> Vec<(SessionId, ItemId, Time)> {
        vec![
            (1, 10, 1),
            (1, 11, 2),
            (1, 12, 3),
            (2, 11, 4),
            (2, 12, 5),
            (2, 13, 6),
            (3, 10, 7),
            (3, 13, 8),
            (4, 14, 9),
            (4, 10, 10),
            (5, 12, 11),
            (5, 14, 12),
        ]
    }

    fn replay_both(
        rows: &[(SessionId, ItemId, Time)],
        calls: &[ItemId],
        k: usize,
        m: usize,
    ) -> (Vec<(ItemId, f64)>, Vec<(ItemId, f64)>) {
        let memory_engine = MemoryEngine::fit(rows, 1.0).unwrap();
        let relational_engine = RelationalEngine::fit(rows, 1.0).unwrap();

        let mut memory_state = PredictionSessionState::new(900);
        let mut relational_state = PredictionSessionState::new(900);
        let mut memory_ranked = Vec::new();
        let mut relational_ranked = Vec::new();
        for item_id in calls {
            memory_state.append_item(*item_id);
            relational_state.append_item(*item_id);
            memory_ranked = predict(&memory_engine, &mut memory_state, k, m, true)
                .into_iter()
                .map(|scored| (scored.id, scored.score))
                .collect();
            relational_ranked = predict(&relational_engine, &mut relational_state, k, m, true)
                .into_iter()
                .map(|scored| (scored.id, scored.score))
                .collect();
        }
        (memory_ranked, relational_ranked)
    }

    #[test]
    fn should_rank_identically_to_the_memory_engine() {
        let (memory_ranked, relational_ranked) =
            replay_both(&training_rows(), &[11, 12, 10], 100, 1000);

        assert_eq!(memory_ranked.len(), relational_ranked.len());
        for (memory_entry, relational_entry) in
            memory_ranked.iter().zip(relational_ranked.iter()).take(20)
        {
            assert_eq!(memory_entry.0, relational_entry.0);
            assert!(approx_eq!(
                f64,
                memory_entry.1,
                relational_entry.1,
                epsilon = 1e-6
            ));
        }
    }

    #[test]
    fn should_agree_under_tight_sampling_and_small_k() {
        // sample cap and k both force the down-sampling paths in each engine
        let (memory_ranked, relational_ranked) =
            replay_both(&training_rows(), &[10, 13], 2, 3);

        for (memory_entry, relational_entry) in
            memory_ranked.iter().zip(relational_ranked.iter()).take(20)
        {
            assert_eq!(memory_entry.0, relational_entry.0);
            assert!(approx_eq!(
                f64,
                memory_entry.1,
                relational_entry.1,
                epsilon = 1e-6
            ));
        }
    }

    #[test]
    fn should_agree_on_sessions_with_revisits() {
        let (memory_ranked, relational_ranked) =
            replay_both(&training_rows(), &[11, 12, 11, 14], 100, 1000);

        for (memory_entry, relational_entry) in
            memory_ranked.iter().zip(relational_ranked.iter()).take(20)
        {
            assert_eq!(memory_entry.0, relational_entry.0);
            assert!(approx_eq!(
                f64,
                memory_entry.1,
                relational_entry.1,
                epsilon = 1e-6
            ));
        }
    }

    #[test]
    fn should_group_table_rows_per_session() {
        let index = TrainingIndex::build(&training_rows(), 1.0).unwrap();
        let engine = RelationalEngine::derive(&index);

        let (start, end) = engine.rows_by_session[&2];
        let rows = &engine.historical_sessions[start as usize..end as usize];
        assert_eq!(3, rows.len());
        assert!(rows.iter().all(|row| row.session_id == 2));
        assert_eq!(6, engine.max_time_of(2));
    }
}
