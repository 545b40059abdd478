pub mod errors;
pub mod gallery;
pub mod ids;
pub mod jobs;
pub mod listing;
pub mod projects;
pub mod repositories;
pub mod request_logs;
pub mod slug;
pub mod tokens;
pub mod users;

// Re-exports
pub use errors::RepositoryError;
