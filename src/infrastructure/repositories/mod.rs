mod gallery;
mod jobs;
mod macros;
mod pagination;
mod projects;
mod request_logs;
mod tokens;
mod users;
mod versions;

pub use gallery::SqlGalleryRepository;
pub use jobs::SqlJobRepository;
pub use projects::SqlProjectRepository;
pub use request_logs::SqlRequestLogRepository;
pub use tokens::SqlTokenRepository;
pub use users::SqlUserRepository;
pub use versions::SqlVersionRepository;
