use hashbrown::HashMap;

use crate::io::{ItemId, SessionId, Time};
use crate::sknn::index::PreconditionError;
use crate::sknn::state::PredictionSessionState;
use crate::sknn::{predict, ItemScore, SimilarityComputation};
use crate::stopwatch::{SequenceDurationMicros, Stopwatch};

/// Model hyperparameters of a predictor instance.
#[derive(Debug, Clone, Copy)]
pub struct PredictorParams {
    pub neighborhood_size_k: usize,
    pub sample_size_m: usize,
    pub idf_weight: f64,
    pub normalize: bool,
}

impl Default for PredictorParams {
    fn default() -> Self {
        PredictorParams {
            neighborhood_size_k: 100,
            sample_size_m: 1000,
            idf_weight: 1.0,
            normalize: true,
        }
    }
}

/// Caller-facing facade over an engine realization. Owns the per-session
/// states keyed by session id and times every call. Calls for the same
/// session id must arrive in order; calls for different session ids are
/// independent of each other.
pub struct SknnPredictor<E: SimilarityComputation> {
    engine: E,
    params: PredictorParams,
    session_states: HashMap<SessionId, PredictionSessionState>,
    stopwatch: Stopwatch,
}

impl<E> SknnPredictor<E>
where
    E: SimilarityComputation + Default + Send + Sync,
{
    /// An unfitted predictor has an empty catalog and predicts empty
    /// vectors until `fit` is called.
    pub fn new(params: PredictorParams) -> Self {
        SknnPredictor {
            engine: E::default(),
            params,
            session_states: HashMap::new(),
            stopwatch: Stopwatch::new(),
        }
    }

    pub fn with_engine(engine: E, params: PredictorParams) -> Self {
        SknnPredictor {
            engine,
            params,
            session_states: HashMap::new(),
            stopwatch: Stopwatch::new(),
        }
    }

    /// Builds the model from training rows pre-sorted by (session_id, time).
    /// Fitting again replaces the model wholesale and forgets all evolving
    /// sessions.
    pub fn fit(&mut self, rows: &[(SessionId, ItemId, Time)]) -> Result<(), PreconditionError> {
        self.engine = E::fit(rows, self.params.idf_weight)?;
        self.session_states.clear();
        Ok(())
    }

    /// Ranks the full training catalog after observing one more interaction
    /// of the given session. A session id seen for the first time starts
    /// from empty state. The timestamp is carried for feed compatibility;
    /// recency sampling works on training-side timestamps.
    pub fn predict_next(
        &mut self,
        session_id: SessionId,
        input_item_id: ItemId,
        _timestamp: Time,
    ) -> Vec<ItemScore> {
        self.stopwatch.start();
        let state = self
            .session_states
            .entry(session_id)
            .or_insert_with(|| PredictionSessionState::new(session_id));
        state.append_item(input_item_id);
        let predictions = predict(
            &self.engine,
            state,
            self.params.neighborhood_size_k,
            self.params.sample_size_m,
            self.params.normalize,
        );
        self.stopwatch.stop();
        predictions
    }

    /// Per-call latencies as (call sequence position, microseconds) tuples,
    /// in call order.
    pub fn get_latencies(&self) -> Vec<SequenceDurationMicros> {
        self.stopwatch.get_latencies()
    }

    pub fn stopwatch(&self) -> &Stopwatch {
        &self.stopwatch
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn params(&self) -> PredictorParams {
        self.params
    }
}

#[cfg(test)]
mod predictor_test {
    use crate::sknn::memory::MemoryEngine;

    use super::*;

    // two historical sessions: S1 = {A, B, C}, S2 = {B, C, D}
    const ITEM_A: ItemId = 10;
    const ITEM_B: ItemId = 11;
    const ITEM_C: ItemId = 12;
    const ITEM_D: ItemId = 13;

    fn training_rows() -> Vec<(SessionId, ItemId, Time)> {
        vec![
            (1, ITEM_A, 1),
            (1, ITEM_B, 2),
            (1, ITEM_C, 3),
            (2, ITEM_B, 1),
            (2, ITEM_C, 2),
            (2, ITEM_D, 3),
        ]
    }

    fn fitted_predictor(params: PredictorParams) -> SknnPredictor<MemoryEngine> {
        let mut predictor = SknnPredictor::new(params);
        predictor.fit(&training_rows()).unwrap();
        predictor
    }

    fn small_params() -> PredictorParams {
        PredictorParams {
            neighborhood_size_k: 10,
            sample_size_m: 10,
            idf_weight: 1.0,
            normalize: true,
        }
    }

    #[test]
    fn should_score_shared_history_after_two_views() {
        let mut predictor = fitted_predictor(small_params());

        predictor.predict_next(100, ITEM_B, 1);
        let predictions = predictor.predict_next(100, ITEM_C, 2);

        assert_eq!(4, predictions.len());
        let score_of = |item_id: ItemId| {
            predictions
                .iter()
                .find(|scored| scored.id == item_id)
                .unwrap()
                .score
        };
        // A (only in S1) and D (only in S2) carry idf weight ln(2) and the
        // same decayed similarity, so both normalize to exactly 1.0
        assert_eq!(1.0, score_of(ITEM_A));
        assert_eq!(1.0, score_of(ITEM_D));
        // C is the just-viewed input item and is forced to zero
        assert_eq!(0.0, score_of(ITEM_C));
        // B occurs in every training session, its idf is zero
        assert_eq!(0.0, score_of(ITEM_B));
    }

    #[test]
    fn should_never_recommend_the_input_item() {
        let mut predictor = fitted_predictor(small_params());

        for (call, item_id) in [ITEM_B, ITEM_C, ITEM_A].iter().enumerate() {
            let predictions = predictor.predict_next(100, *item_id, call as Time);
            let input_score = predictions
                .iter()
                .find(|scored| scored.id == *item_id)
                .unwrap()
                .score;
            assert_eq!(0.0, input_score);
        }
    }

    #[test]
    fn should_return_byte_identical_output_for_identical_call_sequences() {
        let calls = [(100, ITEM_B, 1), (200, ITEM_A, 2), (100, ITEM_C, 3)];

        let mut first = fitted_predictor(small_params());
        let mut second = fitted_predictor(small_params());

        for (session_id, item_id, time) in calls {
            let predictions_first = first.predict_next(session_id, item_id, time);
            let predictions_second = second.predict_next(session_id, item_id, time);
            assert_eq!(predictions_first, predictions_second);
        }
    }

    #[test]
    fn should_track_concurrent_sessions_independently() {
        let mut interleaved = fitted_predictor(small_params());
        interleaved.predict_next(100, ITEM_B, 1);
        interleaved.predict_next(200, ITEM_D, 2);
        let interleaved_result = interleaved.predict_next(100, ITEM_C, 3);

        let mut isolated = fitted_predictor(small_params());
        isolated.predict_next(100, ITEM_B, 1);
        let isolated_result = isolated.predict_next(100, ITEM_C, 3);

        assert_eq!(isolated_result, interleaved_result);
    }

    #[test]
    fn should_normalize_the_maximum_score_to_exactly_one() {
        let mut predictor = fitted_predictor(small_params());
        let predictions = predictor.predict_next(100, ITEM_B, 1);
        let max_score = predictions
            .iter()
            .map(|scored| scored.score)
            .fold(0.0_f64, f64::max);
        assert_eq!(1.0, max_score);
    }

    #[test]
    fn should_predict_all_zero_for_unknown_items() {
        let mut predictor = fitted_predictor(small_params());
        let predictions = predictor.predict_next(100, 999, 1);

        assert_eq!(4, predictions.len());
        assert!(predictions.iter().all(|scored| scored.score == 0.0));
    }

    #[test]
    fn should_contribute_nothing_beyond_the_decay_cutoff() {
        let mut predictor = fitted_predictor(PredictorParams {
            normalize: false,
            ..small_params()
        });

        // view A once, then 100 unknown items: the only shared item is now
        // 101 steps back and every neighbor is dropped
        predictor.predict_next(100, ITEM_A, 1);
        let mut predictions = Vec::new();
        for unknown in 0..100_u64 {
            predictions = predictor.predict_next(100, 5000 + unknown, 2 + unknown as Time);
        }
        assert!(predictions.iter().all(|scored| scored.score == 0.0));
    }

    #[test]
    fn should_return_empty_predictions_before_fit() {
        let mut predictor: SknnPredictor<MemoryEngine> =
            SknnPredictor::new(PredictorParams::default());
        let predictions = predictor.predict_next(100, ITEM_A, 1);
        assert!(predictions.is_empty());
    }

    #[test]
    fn should_forget_sessions_on_refit() {
        let mut predictor = fitted_predictor(small_params());
        predictor.predict_next(100, ITEM_B, 1);

        predictor.fit(&training_rows()).unwrap();
        // a fresh state for session 100: identical to a first call
        let after_refit = predictor.predict_next(100, ITEM_B, 2);
        let mut reference = fitted_predictor(small_params());
        let fresh = reference.predict_next(100, ITEM_B, 2);
        assert_eq!(fresh, after_refit);
    }

    #[test]
    fn should_record_one_latency_tuple_per_call() {
        let mut predictor = fitted_predictor(small_params());
        predictor.predict_next(100, ITEM_B, 1);
        predictor.predict_next(100, ITEM_C, 2);

        let latencies = predictor.get_latencies();
        assert_eq!(2, latencies.len());
        assert_eq!(1, latencies[0].0);
        assert_eq!(2, latencies[1].0);
    }
}
