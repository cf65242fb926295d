//! Repository implementations backing [`RepositoryProvider`](crate::providers::RepositoryProvider).

mod inmemory;
mod json_file;

pub use inmemory::InMemoryRepository;
pub use json_file::JsonFileRepository;
