use std::cmp;

use hashbrown::HashSet;
use itertools::Itertools;

use crate::io::{ItemId, SessionId, Time};
use crate::metrics::SessionMetric;

pub struct Coverage {
    unique_training_items: usize,
    recommended_items: HashSet<u64>,
    length: usize,
}

impl Coverage {
    pub fn new(training_df: &[(SessionId, ItemId, Time)], length: usize) -> Coverage {
        let unique_training_items = training_df
            .iter()
            .map(|record| record.1)
            .unique()
            .count();
        Coverage {
            unique_training_items,
            recommended_items: HashSet::new(),
            length,
        }
    }
}

impl SessionMetric for Coverage {
    fn add(&mut self, recommendations: &[u64], _next_items: &[u64]) {
        for item_id in recommendations
            .iter()
            .take(cmp::min(recommendations.len(), self.length))
        {
            self.recommended_items.insert(*item_id);
        }
    }

    fn result(&self) -> f64 {
        if self.unique_training_items > 0 {
            self.recommended_items.len() as f64 / self.unique_training_items as f64
        } else {
            0.0
        }
    }

    fn get_name(&self) -> String {
        format!("Coverage@{}", self.length)
    }
}
