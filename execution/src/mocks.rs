use crate::HistorySink;
use goldpot_types::{ConfigChangeRecord, HistoryRecord, RoundRecord};
use std::sync::{Arc, Mutex};

/// In-memory history sink. Clones share the same record list.
#[derive(Clone, Default)]
pub struct MemoryHistory {
    records: Arc<Mutex<Vec<HistoryRecord>>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<HistoryRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn rounds(&self) -> Vec<RoundRecord> {
        self.records()
            .into_iter()
            .filter_map(|record| match record {
                HistoryRecord::Round(round) => Some(round),
                HistoryRecord::AdminConfigChange(_) => None,
            })
            .collect()
    }

    pub fn config_changes(&self) -> Vec<ConfigChangeRecord> {
        self.records()
            .into_iter()
            .filter_map(|record| match record {
                HistoryRecord::AdminConfigChange(change) => Some(change),
                HistoryRecord::Round(_) => None,
            })
            .collect()
    }
}

impl HistorySink for MemoryHistory {
    fn record_round(&self, record: RoundRecord) {
        self.records.lock().unwrap().push(HistoryRecord::Round(record));
    }

    fn record_config_change(&self, record: ConfigChangeRecord) {
        self.records
            .lock()
            .unwrap()
            .push(HistoryRecord::AdminConfigChange(record));
    }
}
