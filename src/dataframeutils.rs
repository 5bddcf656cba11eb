use std::sync::Arc;

use chrono::NaiveDateTime;
use rayon::prelude::*;

use crate::io::{ItemId, SessionId, Time};
use crate::sessions::RocksDBSessionStore;
use crate::sknn::memory::MemoryEngine;

/// Handles and hyperparameters shared by all serving workers.
pub struct SharedHandlesAndConfig {
    pub session_store: Arc<RocksDBSessionStore>,
    pub engine: Arc<MemoryEngine>,
    pub training_data_stats: Arc<TrainingDataStats>,
    pub neighborhood_size_k: usize,
    pub sample_size_m: usize,
    pub normalize: bool,
    pub num_items_to_recommend: usize,
    pub max_items_in_session: usize,
    pub qty_workers: usize,
    pub db_compaction_ttl_in_secs: usize,
}

pub struct TrainingDataStats {
    pub descriptive_name: String,
    pub qty_records: usize,
    pub qty_unique_session_ids: usize,
    pub qty_unique_item_ids: usize,
    pub min_time_date_time: NaiveDateTime,
    pub max_time_date_time: NaiveDateTime,
}

pub fn determine_training_data_statistics(
    descriptive_name: &str,
    training_data: &[(SessionId, ItemId, Time)],
) -> TrainingDataStats {
    let qty_records = training_data.len();

    let mut session_ids: Vec<SessionId> = training_data
        .into_par_iter()
        .map(|(session_id, _item_id, _time)| *session_id)
        .collect();
    session_ids.par_sort_unstable();
    session_ids.dedup();
    let qty_unique_session_ids = session_ids.len();

    let mut item_ids: Vec<ItemId> = training_data
        .into_par_iter()
        .map(|(_session_id, item_id, _time)| *item_id)
        .collect();
    item_ids.par_sort_unstable();
    item_ids.dedup();
    let qty_unique_item_ids = item_ids.len();

    let min_time = training_data
        .par_iter()
        .map(|(_session_id, _item_id, time)| *time)
        .min()
        .unwrap_or(0);
    let max_time = training_data
        .par_iter()
        .map(|(_session_id, _item_id, time)| *time)
        .max()
        .unwrap_or(0);

    let min_time_date_time = NaiveDateTime::from_timestamp(min_time as i64, 0);
    let max_time_date_time = NaiveDateTime::from_timestamp(max_time as i64, 0);

    println!("Loaded {}", descriptive_name);
    println!("\tEvents: {}", qty_records);
    println!("\tSessions: {}", qty_unique_session_ids);
    println!("\tItems: {}", qty_unique_item_ids);
    println!("\tSpan: {} / {}", min_time_date_time, max_time_date_time);

    TrainingDataStats {
        descriptive_name: descriptive_name.to_string(),
        qty_records,
        qty_unique_session_ids,
        qty_unique_item_ids,
        min_time_date_time,
        max_time_date_time,
    }
}
