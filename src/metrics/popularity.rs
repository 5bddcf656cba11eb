use std::cmp;

use hashbrown::{HashMap, HashSet};

use crate::io::{ItemId, SessionId, Time};
use crate::metrics::SessionMetric;

pub struct Popularity {
    sum_of_scores: f64,
    qty: usize,
    popularity_scores: HashMap<ItemId, i32>,
    length: usize,
    max_frequency: i32,
}

impl Popularity {
    pub fn new(training_df: &[(SessionId, ItemId, Time)], length: usize) -> Popularity {
        let mut popularity_scores = HashMap::with_capacity(training_df.len());
        let mut max_frequency = 0;
        for (_session_id, item_id, _time) in training_df.iter() {
            let counter = popularity_scores.entry(*item_id).or_insert(0);
            *counter += 1;
            max_frequency = cmp::max(*counter, max_frequency);
        }

        Popularity {
            sum_of_scores: 0.0,
            qty: 0,
            popularity_scores,
            length,
            max_frequency,
        }
    }
}

impl SessionMetric for Popularity {
    fn add(&mut self, recommendations: &[u64], _next_items: &[u64]) {
        self.qty += 1;
        let top_recos: HashSet<&u64> = recommendations
            .iter()
            .take(cmp::min(recommendations.len(), self.length))
            .collect();
        if !top_recos.is_empty() {
            let mut sum = 0_f64;
            for item_id in top_recos.iter() {
                if let Some(item_frequency) = self.popularity_scores.get(item_id) {
                    sum += *item_frequency as f64 / self.max_frequency as f64
                }
            }
            self.sum_of_scores += sum / top_recos.len() as f64;
        }
    }

    fn result(&self) -> f64 {
        if self.qty > 0 {
            self.sum_of_scores / self.qty as f64
        } else {
            0.0
        }
    }

    fn get_name(&self) -> String {
        format!("Popularity@{}", self.length)
    }
}

#[cfg(test)]
mod popularity_test {
    use super::*;

    #[test]
    fn should_score_recommendations_of_frequent_items_higher() {
        // item 10 occurs three times, item 11 once
        let training_df = vec![(1, 10, 1), (1, 11, 2), (2, 10, 3), (3, 10, 4)];

        let mut popular = Popularity::new(&training_df, 20);
        popular.add(&[10], &[11]);

        let mut rare = Popularity::new(&training_df, 20);
        rare.add(&[11], &[11]);

        assert_eq!(1.0, popular.result());
        assert!((rare.result() - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!("Popularity@20", popular.get_name());
    }
}
