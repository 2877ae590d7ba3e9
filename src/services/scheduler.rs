use std::error::Error;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use uuid::Uuid;

use crate::services::competition_service::CompetitionService;

/// Periodic re-evaluation of every active cup bracket.
///
/// Approvals already advance the bracket inline; the sweep picks up anything an
/// interrupted request left half-done.
pub struct SchedulerService {
    scheduler: Arc<Mutex<JobScheduler>>,
    service: Arc<CompetitionService>,
    sweep_job: Arc<Mutex<Option<Uuid>>>,
}

impl SchedulerService {
    pub async fn new(service: Arc<CompetitionService>) -> Result<Self, Box<dyn Error>> {
        let scheduler = JobScheduler::new().await?;

        Ok(Self {
            scheduler: Arc::new(Mutex::new(scheduler)),
            service,
            sweep_job: Arc::new(Mutex::new(None)),
        })
    }

    pub async fn start(&self) -> Result<(), Box<dyn Error>> {
        let scheduler = self.scheduler.lock().await;
        scheduler.start().await?;

        tracing::info!("✅ Scheduler service started");
        Ok(())
    }

    pub async fn stop(&self) -> Result<(), Box<dyn Error>> {
        let mut scheduler = self.scheduler.lock().await;
        scheduler.shutdown().await?;

        tracing::info!("🛑 Scheduler service stopped");
        Ok(())
    }

    /// Register the bracket sweep on a six-field cron expression. Replaces a
    /// previously registered sweep.
    pub async fn schedule_bracket_sweep(&self, cron_expr: &str) -> Result<Uuid, JobSchedulerError> {
        let service = self.service.clone();

        let sweep = Job::new_async(cron_expr, move |_uuid, _l| {
            let service = service.clone();

            Box::pin(async move {
                match service.sweep_active_brackets().await {
                    Ok(summary) => {
                        tracing::info!(
                            "🔁 Bracket sweep: {} competitions, {} fixtures created, {} champions, {} failures",
                            summary.competitions,
                            summary.fixtures_created,
                            summary.champions_decided,
                            summary.failures
                        );
                    }
                    Err(e) => {
                        tracing::error!("❌ Bracket sweep failed: {}", e);
                    }
                }
            })
        })?;

        let job_id = sweep.guid();
        let scheduler = self.scheduler.lock().await;
        let mut sweep_job = self.sweep_job.lock().await;

        if let Some(previous) = sweep_job.take() {
            scheduler.remove(&previous).await?;
        }
        scheduler.add(sweep).await?;
        *sweep_job = Some(job_id);

        tracing::info!("✅ Scheduled bracket sweep ({})", cron_expr);
        Ok(job_id)
    }

    pub async fn unschedule_bracket_sweep(&self) -> Result<(), JobSchedulerError> {
        if let Some(job_id) = self.sweep_job.lock().await.take() {
            let scheduler = self.scheduler.lock().await;
            scheduler.remove(&job_id).await?;
            tracing::info!("Removed bracket sweep");
        }
        Ok(())
    }

    pub async fn sweep_job_id(&self) -> Option<Uuid> {
        *self.sweep_job.lock().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::services::competition_events::CompetitionEvents;

    async fn scheduler() -> SchedulerService {
        let service = CompetitionService::with_store(
            Arc::new(MemoryStore::new()),
            CompetitionEvents::disabled(),
        );
        SchedulerService::new(Arc::new(service)).await.unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_rescheduling_replaces_the_sweep() {
        let scheduler = scheduler().await;
        assert!(scheduler.sweep_job_id().await.is_none());

        let first = scheduler.schedule_bracket_sweep("0 */5 * * * *").await.unwrap();
        let second = scheduler.schedule_bracket_sweep("0 * * * * *").await.unwrap();
        assert_ne!(first, second);
        assert_eq!(scheduler.sweep_job_id().await, Some(second));

        scheduler.unschedule_bracket_sweep().await.unwrap();
        assert!(scheduler.sweep_job_id().await.is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_invalid_cron_is_rejected() {
        let scheduler = scheduler().await;
        assert!(scheduler.schedule_bracket_sweep("every five minutes").await.is_err());
        assert!(scheduler.sweep_job_id().await.is_none());
    }
}
