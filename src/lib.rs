pub mod config;
pub mod dataframeutils;
pub mod endpoints;
pub mod hyperparameter;
pub mod io;
pub mod metrics;
pub mod objective;
pub mod sessions;
pub mod sknn;
pub mod stopwatch;
