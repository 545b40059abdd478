mod gallery_api;
mod helpers;
mod import_api;
mod jobs_api;
mod tokens_api;
