use covisit::config::AppConfig;
use covisit::dataframeutils::determine_training_data_statistics;
use covisit::io;
use covisit::metrics::evaluation_reporter::EvaluationReporter;
use covisit::sknn::memory::MemoryEngine;
use covisit::sknn::predictor::{PredictorParams, SknnPredictor};

fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).unwrap_or_default();
    let config = AppConfig::new(config_path);

    let params = PredictorParams {
        neighborhood_size_k: config.model.neighborhood_size_k,
        sample_size_m: config.model.sample_size_m,
        idf_weight: config.model.idf_weight,
        normalize: config.model.normalize,
    };
    let num_items_to_recommend = config.model.num_items_to_recommend;

    let training_data = io::read_training_data(&config.data.training_data_path);
    determine_training_data_statistics(&config.data.training_data_path, &training_data);

    let mut predictor: SknnPredictor<MemoryEngine> = SknnPredictor::new(params);
    predictor.fit(&training_data)?;

    let test_data_file = config.hyperparam.test_data_path;
    println!("test_data_file:{}", test_data_file);
    let ordered_test_sessions = io::read_test_data_evolving(&test_data_file);

    let mut reporter = EvaluationReporter::new(&training_data, num_items_to_recommend);

    // the replayer streams one interaction at a time through predict_next
    // and evaluates the ranked result against the actual remainder of the
    // test session
    for (session_id, events) in ordered_test_sessions.iter() {
        for session_state in 1..events.len() {
            let (input_item_id, time) = events[session_state - 1];
            let predictions = predictor.predict_next(*session_id, input_item_id, time);
            let recommended_items: Vec<u64> = predictions
                .iter()
                .take(num_items_to_recommend)
                .map(|scored| scored.id)
                .collect();
            let actual_next_items: Vec<u64> = events[session_state..]
                .iter()
                .map(|(item_id, _time)| *item_id)
                .collect();
            reporter.add(&recommended_items, &actual_next_items);
        }
    }

    let stopwatch = predictor.stopwatch();
    println!("===============================================================");
    println!("===               START EVALUATING TEST FILE               ====");
    println!("===============================================================");
    println!("{}", reporter.get_name());
    println!("{}", reporter.result());
    println!("Qty test evaluations: {}", stopwatch.get_n());
    println!("Prediction latency");
    println!("p90 (microseconds): {}", stopwatch.get_percentile_in_micros(90.0));
    println!("p95 (microseconds): {}", stopwatch.get_percentile_in_micros(95.0));
    println!("p99.5 (microseconds): {}", stopwatch.get_percentile_in_micros(99.5));

    Ok(())
}
