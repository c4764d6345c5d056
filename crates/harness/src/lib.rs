pub mod fixtures;
pub mod session;
pub mod stores;

pub use session::{TestSession, sqlite_with_table};
pub use stores::{CountingStore, FailingStore};
