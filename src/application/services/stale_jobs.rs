use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::domain::repositories::JobRepository;

/// How long a job may sit in `pending` before the sweeper fails it.
pub const STALE_JOB_MAX_AGE: Duration = Duration::from_secs(3600);

/// Background task that periodically fails pending jobs left behind by a
/// crashed or interrupted workflow call.
pub async fn stale_job_sweep_task(job_repo: Arc<dyn JobRepository>, period: Duration) {
    let mut interval = tokio::time::interval(period);
    loop {
        interval.tick().await;
        match job_repo.fail_stale(STALE_JOB_MAX_AGE).await {
            Ok(count) if count > 0 => {
                info!(count, "swept stale pending jobs");
            }
            Err(err) => {
                warn!(error = %err, "stale job sweep failed");
            }
            _ => {}
        }
    }
}
