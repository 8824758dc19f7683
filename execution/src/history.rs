use std::sync::Arc;

use goldpot_types::{ConfigChangeRecord, RoundRecord};

/// Destination for history records.
///
/// Implementations must not block: the engine calls these while it holds the
/// round state, and a failed append must never undo a transition.
pub trait HistorySink {
    /// Append a settled round.
    fn record_round(&self, record: RoundRecord);

    /// Append an administrator configuration change.
    fn record_config_change(&self, record: ConfigChangeRecord);
}

impl<T: HistorySink + ?Sized> HistorySink for Arc<T> {
    fn record_round(&self, record: RoundRecord) {
        (**self).record_round(record)
    }

    fn record_config_change(&self, record: ConfigChangeRecord) {
        (**self).record_config_change(record)
    }
}
