pub mod manager;
pub mod postgres;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use postgres::PgTreeStore;
pub use store::{FlatRecordStore, InMemoryStore};
