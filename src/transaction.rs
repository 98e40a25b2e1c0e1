pub mod full_state;
pub mod history;
pub mod transaction;

pub use full_state::FullStateSnapshot;
pub use history::CommandHistory;
pub use transaction::{SlotSnapshot, Transaction};
