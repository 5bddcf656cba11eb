use crate::io;
use crate::io::Time;
use crate::metrics::mrr::Mrr;
use crate::metrics::SessionMetric;
use crate::sknn::memory::MemoryEngine;
use crate::sknn::predictor::{PredictorParams, SknnPredictor};

/// Validation MRR@20 for one hyperparameter combination, the objective of
/// the search binary.
pub fn objective(
    path_to_training: &str,
    path_to_validation: &str,
    neighborhood_size_k: usize,
    sample_size_m: usize,
    idf_weight: f64,
) -> f64 {
    let params = PredictorParams {
        neighborhood_size_k,
        sample_size_m,
        idf_weight,
        normalize: true,
    };
    let mut predictor: SknnPredictor<MemoryEngine> = SknnPredictor::new(params);
    let training_data = io::read_training_data(path_to_training);
    predictor
        .fit(&training_data)
        .expect("reader output is sorted by (session_id, time)");

    let ordered_test_sessions = io::read_test_data_evolving(path_to_validation);

    let qty_max_reco_results = 20;
    let mut mymetric = Mrr::new(qty_max_reco_results);

    for (session_id, events) in ordered_test_sessions.iter() {
        for session_state in 1..events.len() {
            let (input_item_id, time): (u64, Time) = events[session_state - 1];
            let predictions = predictor.predict_next(*session_id, input_item_id, time);
            let recommended_items: Vec<u64> = predictions
                .iter()
                .take(qty_max_reco_results)
                .map(|scored| scored.id)
                .collect();
            let actual_next_items: Vec<u64> = events[session_state..]
                .iter()
                .map(|(item_id, _time)| *item_id)
                .collect();
            mymetric.add(&recommended_items, &actual_next_items);
        }
    }
    mymetric.result()
}
