use std::collections::HashMap;

use csv::Writer;
use indicatif::ProgressBar;

use covisit::config::AppConfig;
use covisit::hyperparameter::hyperparamgrid::HyperParamGrid;
use covisit::objective;

fn parse_choices(choices: &str) -> Vec<usize> {
    choices
        .split(',')
        .map(|value| {
            value
                .trim()
                .parse::<usize>()
                .unwrap_or_else(|_| panic!("Invalid hyperparameter choice: {}", value))
        })
        .collect()
}

fn main() -> anyhow::Result<()> {
    // get params from config file
    let config_path = std::env::args().nth(1).expect("Config file not specified!");
    let config = AppConfig::new(config_path);
    let train_data_path = config.data.training_data_path;
    let validation_data_path = config.hyperparam.validation_data_path;
    let num_iterations = config.hyperparam.num_iterations;
    let save_records = config.hyperparam.save_records;
    let out_path = config.hyperparam.out_path;

    let mut param_grid = HashMap::new();
    param_grid.insert(
        "neighborhood_size_k".to_string(),
        parse_choices(&config.hyperparam.neighborhood_size_k_choices),
    );
    param_grid.insert(
        "sample_size_m".to_string(),
        parse_choices(&config.hyperparam.sample_size_m_choices),
    );
    param_grid.insert(
        "idf_weight".to_string(),
        parse_choices(&config.hyperparam.idf_weight_choices),
    );
    let grid = HyperParamGrid { param_grid };

    let combinations = grid.get_n_random_combinations(num_iterations);
    println!(
        "Evaluating {} of {} hyperparameter combinations",
        combinations.len(),
        grid.get_qty_combinations()
    );
    let pb = ProgressBar::new(combinations.len() as u64);

    let mut wtr = Writer::from_path(out_path)?;
    if save_records {
        wtr.write_record([
            "iteration",
            "neighborhood_size_k",
            "sample_size_m",
            "idf_weight",
            "MRR@20",
        ])?;
    }

    let mut best_value = f64::NEG_INFINITY;
    let mut best_combination: HashMap<String, usize> = HashMap::new();

    for (iteration, combination) in combinations.into_iter().enumerate() {
        pb.inc(1);
        let neighborhood_size_k = combination["neighborhood_size_k"];
        let sample_size_m = combination["sample_size_m"];
        let idf_weight = combination["idf_weight"];

        let v = objective::objective(
            &train_data_path,
            &validation_data_path,
            neighborhood_size_k,
            sample_size_m,
            idf_weight as f64,
        );

        if save_records {
            wtr.write_record([
                iteration.to_string(),
                neighborhood_size_k.to_string(),
                sample_size_m.to_string(),
                idf_weight.to_string(),
                v.to_string(),
            ])?;
        }
        if v > best_value {
            best_value = v;
            best_combination = combination;
        }
    }

    println!(
        "Best neighborhood_size_k: {}",
        best_combination["neighborhood_size_k"]
    );
    println!("Best sample_size_m: {}", best_combination["sample_size_m"]);
    println!("Best idf_weight: {}", best_combination["idf_weight"]);
    println!("Best value for the goal metric: {}", best_value);

    wtr.flush()?;

    Ok(())
}
