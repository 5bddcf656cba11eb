use crate::io::{ItemId, SessionId, Time};
use crate::metrics::coverage::Coverage;
use crate::metrics::hitrate::HitRate;
use crate::metrics::mrr::Mrr;
use crate::metrics::ndcg::Ndcg;
use crate::metrics::popularity::Popularity;
use crate::metrics::SessionMetric;

/// Bundles the offline metrics reported after a replay run.
pub struct EvaluationReporter {
    metrics: Vec<Box<dyn SessionMetric>>,
}

impl EvaluationReporter {
    pub fn new(
        training_df: &[(SessionId, ItemId, Time)],
        length: usize,
    ) -> EvaluationReporter {
        let metrics: Vec<Box<dyn SessionMetric>> = vec![
            Box::new(Mrr::new(length)),
            Box::new(Ndcg::new(length)),
            Box::new(HitRate::new(length)),
            Box::new(Coverage::new(training_df, length)),
            Box::new(Popularity::new(training_df, length)),
        ];
        EvaluationReporter { metrics }
    }

    pub fn add(&mut self, recommendations: &[u64], next_items: &[u64]) {
        for metric in self.metrics.iter_mut() {
            metric.add(recommendations, next_items);
        }
    }

    pub fn result(&self) -> String {
        self.metrics
            .iter()
            .map(|metric| format!("{:.4}", metric.result()))
            .collect::<Vec<String>>()
            .join(",")
    }

    pub fn get_name(&self) -> String {
        self.metrics
            .iter()
            .map(|metric| metric.get_name())
            .collect::<Vec<String>>()
            .join(",")
    }
}

#[cfg(test)]
mod evaluation_reporter_test {
    use super::*;

    #[test]
    fn should_report_all_metric_names_and_results() {
        let training_df = vec![(1, 10, 1), (1, 11, 2), (2, 10, 3)];
        let mut reporter = EvaluationReporter::new(&training_df, 20);
        reporter.add(&[11, 10], &[11]);

        assert_eq!(
            "Mrr@20,Ndcg@20,HitRate@20,Coverage@20,Popularity@20",
            reporter.get_name()
        );
        let result = reporter.result();
        assert_eq!(5, result.split(',').count());
        assert!(result.starts_with("1.0000"));
    }
}
