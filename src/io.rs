use itertools::Itertools;

pub type SessionId = u32;
pub type ItemId = u64;
pub type Time = u32;

/// Reads a tab separated file with a `SessionId ItemId Time` header and
/// returns the interactions sorted ascending by (session_id, time).
/// The index builder requires this ordering; sorting here keeps that
/// contract on the caller side of the engine.
pub fn read_training_data(training_data_path: &str) -> Vec<(SessionId, ItemId, Time)> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_path(training_data_path)
        .unwrap_or_else(|_| panic!("Unable to open input file: {}", training_data_path));

    let mut interactions: Vec<(SessionId, ItemId, Time)> = Vec::new();
    reader.deserialize().for_each(|result| {
        if let Ok(raw) = result {
            let (session_id, item_id, time): (SessionId, ItemId, f64) = raw;
            interactions.push((session_id, item_id, time.round() as Time));
        } else {
            eprintln!("Unable to parse input line!");
        }
    });

    interactions.sort_unstable_by_key(|(session_id, item_id, time)| (*session_id, *time, *item_id));
    interactions
}

/// Groups a test file into evolving sessions for replay: one ordered
/// (item_id, time) sequence per session, sessions ordered by ascending id
/// so replay runs are reproducible.
pub fn read_test_data_evolving(test_data_file: &str) -> Vec<(SessionId, Vec<(ItemId, Time)>)> {
    read_training_data(test_data_file)
        .into_iter()
        .map(|(session_id, item_id, time)| (session_id, (item_id, time)))
        .into_group_map()
        .into_iter()
        .map(|(session_id, mut events)| {
            events.sort_unstable_by_key(|(_item_id, time)| *time);
            (session_id, events)
        })
        .sorted_unstable_by_key(|(session_id, _events)| *session_id)
        .collect()
}
