#[macro_use]
extern crate bencher;
extern crate covisit;
extern crate rand;

use bencher::Bencher;
use rand::prelude::*;

use covisit::io::{ItemId, SessionId, Time};
use covisit::sknn::memory::MemoryEngine;
use covisit::sknn::predict;
use covisit::sknn::relational::RelationalEngine;
use covisit::sknn::state::PredictionSessionState;
use covisit::sknn::SimilarityComputation;

benchmark_group!(benches, memory_engine_predict, relational_engine_predict);
benchmark_main!(benches);

const QTY_SESSIONS: u32 = 10_000;
const QTY_ITEMS: u64 = 1_000;
const NEIGHBORHOOD_SIZE_K: usize = 100;
const SAMPLE_SIZE_M: usize = 1000;

fn synthetic_training_data() -> Vec<(SessionId, ItemId, Time)> {
    let mut rng = StdRng::seed_from_u64(42);
    let mut rows = Vec::new();
    for session_id in 1..=QTY_SESSIONS {
        let session_length = rng.gen_range(2..8);
        for event in 0..session_length {
            let item_id = rng.gen_range(1..=QTY_ITEMS);
            rows.push((session_id, item_id, session_id + event));
        }
    }
    rows
}

fn evolving_session(rng: &mut StdRng) -> Vec<ItemId> {
    (0..3).map(|_| rng.gen_range(1..=QTY_ITEMS)).collect()
}

fn memory_engine_predict(bench: &mut Bencher) {
    let rows = synthetic_training_data();
    let engine = MemoryEngine::fit(&rows, 1.0).unwrap();
    let mut rng = StdRng::seed_from_u64(4711);

    bench.iter(|| {
        let items = evolving_session(&mut rng);
        let mut state = PredictionSessionState::from_items(1, &items);
        predict(&engine, &mut state, NEIGHBORHOOD_SIZE_K, SAMPLE_SIZE_M, true)
    });
}

fn relational_engine_predict(bench: &mut Bencher) {
    let rows = synthetic_training_data();
    let engine = RelationalEngine::fit(&rows, 1.0).unwrap();
    let mut rng = StdRng::seed_from_u64(4711);

    bench.iter(|| {
        let items = evolving_session(&mut rng);
        let mut state = PredictionSessionState::from_items(1, &items);
        predict(&engine, &mut state, NEIGHBORHOOD_SIZE_K, SAMPLE_SIZE_M, true)
    });
}
