pub mod archive;
pub mod auth;
pub mod client;
pub mod database;
pub mod generation;
pub mod image_processing;
pub mod media_host;
pub mod repositories;
