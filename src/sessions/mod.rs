use std::time::{Duration, SystemTime};

use rocksdb::{Options, DB};
use serde::{Deserialize, Serialize};

use crate::io::ItemId;

// An evolving session that pauses longer than this is treated as abandoned.
const MAX_SESSION_IDLE_SECS: u64 = 20 * 60;

/// RocksDB-backed store for the item histories of evolving sessions,
/// keyed by the hashed session id.
pub struct RocksDBSessionStore {
    rocks_db: DB,
}

#[derive(Serialize, Deserialize, Debug)]
struct StoredEvolvingSession {
    evolving_items: Vec<ItemId>,
    epoch_secs: u64,
}

impl RocksDBSessionStore {
    pub fn new(database_file: &str, compaction_ttl: Duration) -> Self {
        let mut options = Options::default();
        options.create_if_missing(true);
        options.optimize_for_point_lookup(5000);
        options.set_allow_mmap_reads(true);
        options.set_allow_mmap_writes(true);

        let rocks_db = DB::open_with_ttl(&options, database_file, compaction_ttl).unwrap();

        Self { rocks_db }
    }

    pub fn get_evolving_items(&self, evolving_session_id: &u128) -> Vec<ItemId> {
        let serialized_session_id = bincode::serialize(&evolving_session_id).unwrap();
        let bytes = self.rocks_db.get(&serialized_session_id).unwrap();

        match bytes {
            Some(bytes) => {
                let payload: StoredEvolvingSession = bincode::deserialize(&bytes).unwrap();
                let seconds_since_last_event =
                    seconds_since_epoch() - payload.epoch_secs;
                if seconds_since_last_event <= MAX_SESSION_IDLE_SECS {
                    payload.evolving_items
                } else {
                    Vec::new()
                }
            }
            None => Vec::new(),
        }
    }

    pub fn update_evolving_items(&self, evolving_session_id: &u128, evolving_items: &[ItemId]) {
        let serialized_session_id = bincode::serialize(evolving_session_id).unwrap();
        let payload = StoredEvolvingSession {
            evolving_items: Vec::from(evolving_items),
            epoch_secs: seconds_since_epoch(),
        };
        let bytes = bincode::serialize(&payload).unwrap();

        self.rocks_db.put(&serialized_session_id, &bytes).unwrap();
    }
}

fn seconds_since_epoch() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs()
}
