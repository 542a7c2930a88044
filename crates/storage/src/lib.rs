#![forbid(unsafe_code)]

pub mod json_file;
pub mod store;

pub use json_file::JsonFileStore;
pub use store::{InMemoryStore, ProgressStorage, ProgressStore, StoreError};
