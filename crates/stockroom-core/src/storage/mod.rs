// ── Persistent key-value storage ──
//
// Session token and favorites cache live behind this interface so the
// front-ends can back it with a file and tests with a map.

mod file;
mod memory;

use std::path::PathBuf;

use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Key holding the session token.
pub const TOKEN_KEY: &str = "token";

/// Key holding the favorites snapshot blob.
pub const FAVORITES_KEY: &str = "favoriteProducts";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Cannot access store at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Store at {} is not valid JSON: {message}", path.display())]
    Corrupt { path: PathBuf, message: String },

    #[error("Store lock poisoned")]
    Poisoned,
}

/// String-to-string persistent store. Values are replaced whole.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
