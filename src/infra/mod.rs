//! Infrastructure adapters for snapshot stores and the patient directory.

pub mod directory;
pub mod store;

pub use directory::InMemoryDirectory;
pub use store::{FileStore, InMemoryStore};
