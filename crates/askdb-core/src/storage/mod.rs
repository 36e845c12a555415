pub mod history;
pub mod schema;

pub use history::{HistoryEntry, HistoryStore};
