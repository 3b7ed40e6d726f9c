mod kv_store;
mod memory_store;
mod sqlite_store;
mod favorites_store;

pub use kv_store::KeyValueStore;
pub use memory_store::MemoryStore;
pub use sqlite_store::SqliteStore;
pub use favorites_store::{FavoritesStore, FAVORITES_KEY};
