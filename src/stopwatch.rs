use std::time::Instant;
use tdigest::TDigest;

/// (call sequence position, duration in microseconds)
pub type SequenceDurationMicros = (u32, f64);

/// Latency bookkeeping around prediction calls. Purely observational:
/// measured durations never influence ranking results.
#[derive(Clone)]
pub struct Stopwatch {
    start_time: Instant,
    prediction_durations: Vec<SequenceDurationMicros>,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwatch {
    pub fn new() -> Stopwatch {
        Stopwatch {
            start_time: Instant::now(),
            prediction_durations: Vec::new(),
        }
    }

    pub fn start(&mut self) {
        self.start_time = Instant::now();
    }

    /// Records the elapsed time since `start` under the next call sequence
    /// position (1-based).
    pub fn stop(&mut self) {
        let duration = self.start_time.elapsed();
        let duration_as_micros: f64 = duration.as_micros() as f64;
        let sequence_position = self.prediction_durations.len() as u32 + 1;
        self.prediction_durations.push((sequence_position, duration_as_micros));
    }

    pub fn get_n(&self) -> usize {
        self.prediction_durations.len()
    }

    pub fn get_percentile_in_micros(&self, q: f64) -> f64 {
        let t_digest = TDigest::new_with_size(100);
        let durations = self
            .prediction_durations
            .iter()
            .map(|tuple| tuple.1)
            .collect();
        let sorted_digest = t_digest.merge_unsorted(durations);
        sorted_digest.estimate_quantile(q)
    }

    /// Raw per-call latencies in call order.
    pub fn get_latencies(&self) -> Vec<SequenceDurationMicros> {
        self.prediction_durations.clone()
    }
}

#[cfg(test)]
mod stopwatch_test {
    use super::*;

    #[test]
    fn should_number_calls_sequentially() {
        let mut stopwatch = Stopwatch::new();
        for _ in 0..3 {
            stopwatch.start();
            stopwatch.stop();
        }
        let latencies = stopwatch.get_latencies();
        assert_eq!(3, stopwatch.get_n());
        let positions: Vec<u32> = latencies.iter().map(|tuple| tuple.0).collect();
        assert_eq!(vec![1, 2, 3], positions);
    }
}
