//! Persistence adapter: key-value backends and the session repository.

mod file;
mod memory;
mod repository;

pub use file::FileKeyValueStore;
pub use memory::MemoryKeyValueStore;
pub use repository::SessionRepository;

use mentor_common::StoreError;

/// Minimal string key-value store, the shape of browser local storage.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}
