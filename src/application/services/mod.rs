pub mod batch_import;
pub mod stale_jobs;
