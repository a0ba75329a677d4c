use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;

use crate::api::SharedState;

pub mod refresh_token;
pub use refresh_token::RefreshMessagingToken;

#[async_trait]
pub trait PeriodicJob: Send + Sync + 'static {
    fn interval(&self) -> Duration;

    async fn run_job(&self, state: &SharedState);
}

/// Run `job` in its own task every `job.interval()`, starting one interval
/// from now.
pub fn spawn_periodic_job(state: SharedState, job: impl PeriodicJob) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(job.interval());
        // The first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            job.run_job(&state).await;
        }
    })
}
