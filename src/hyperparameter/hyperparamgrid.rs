use std::collections::HashMap;

use itertools::Itertools;
use rand::seq::SliceRandom;
use rand::thread_rng;

pub struct HyperParamGrid {
    pub param_grid: HashMap<String, Vec<usize>>,
}

impl HyperParamGrid {
    /// Returns up to `n` unique random combinations out of all
    /// hyperparameter combinations. Assumes the values given for each
    /// parameter are unique.
    pub fn get_n_random_combinations(&self, n: usize) -> Vec<HashMap<String, usize>> {
        let mut all_combinations = self.get_all_combinations();
        all_combinations.shuffle(&mut thread_rng());
        all_combinations.into_iter().take(n).collect()
    }

    pub fn get_all_combinations(&self) -> Vec<HashMap<String, usize>> {
        let param_names: Vec<&String> = self.param_grid.keys().collect();
        let value_choices: Vec<&Vec<usize>> = param_names
            .iter()
            .map(|name| &self.param_grid[*name])
            .collect();

        value_choices
            .iter()
            .map(|choices| choices.iter().copied())
            .multi_cartesian_product()
            .map(|combination| {
                param_names
                    .iter()
                    .zip(combination)
                    .map(|(name, value)| ((*name).clone(), value))
                    .collect()
            })
            .collect()
    }

    pub fn get_qty_combinations(&self) -> usize {
        self.param_grid
            .values()
            .map(|valid_values| valid_values.len())
            .product()
    }
}

#[cfg(test)]
mod hyperparamgrid_test {
    use super::*;

    fn grid() -> HyperParamGrid {
        let mut param_grid = HashMap::new();
        param_grid.insert("sample_size_m".to_string(), vec![500, 750, 1000, 2500, 5000]);
        param_grid.insert("neighborhood_size_k".to_string(), vec![50, 100, 500, 1000, 1500]);
        param_grid.insert("idf_weight".to_string(), vec![1, 2, 3, 5, 10]);
        HyperParamGrid { param_grid }
    }

    #[test]
    fn should_get_expected_results() {
        let mut param_grid = HashMap::new();
        param_grid.insert("sample_size_m".to_string(), vec![1000]);
        param_grid.insert("neighborhood_size_k".to_string(), vec![500]);

        let hyper_parametergrid = HyperParamGrid { param_grid };
        let combinations = hyper_parametergrid.get_all_combinations();
        assert_eq!(1, combinations.len());
        let hyperparameters = combinations[0].clone();
        assert_eq!(1000, *hyperparameters.get("sample_size_m").unwrap());
        assert_eq!(500, *hyperparameters.get("neighborhood_size_k").unwrap());
    }

    #[test]
    fn should_determine_qty_combinations() {
        assert_eq!(5 * 5 * 5, grid().get_qty_combinations());
    }

    #[test]
    fn should_get_all_combinations() {
        let combinations = grid().get_all_combinations();
        assert_eq!(5 * 5 * 5, combinations.len());
        assert_eq!(3, combinations.get(0).unwrap().len());
    }

    #[test]
    fn should_get_n_random_combinations() {
        let combinations = grid().get_n_random_combinations(100000000);
        assert_eq!(5 * 5 * 5, combinations.len());

        let n_random_combinations = grid().get_n_random_combinations(10);
        assert_eq!(10, n_random_combinations.len());
    }
}
