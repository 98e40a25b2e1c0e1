pub mod dummy;
pub mod journal;
pub mod observer;
pub mod snapshot;

pub use dummy::DummyHistoryJournal;
pub use journal::{GraphHistoryJournal, HistoryJournal};
pub use observer::{JournalChange, JournalObserver, Observers, SubscriptionId};
pub use snapshot::{Snapshot, SnapshotId};

use crate::config::HistoryConfig;

/// Build the journal an editor should use for the given settings
///
/// A history size of 0 yields a [`DummyHistoryJournal`], so callers never branch on
/// whether history tracking is enabled.
pub fn from_config(config: &HistoryConfig) -> Box<dyn HistoryJournal> {
    if config.max_history_size == 0 {
        Box::new(DummyHistoryJournal::new())
    } else {
        Box::new(GraphHistoryJournal::new(config.max_history_size))
    }
}

#[cfg(test)]
mod test;
