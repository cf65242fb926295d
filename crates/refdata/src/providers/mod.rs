mod repository;

pub use repository::RepositoryProvider;
