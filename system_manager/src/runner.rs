//! Runs tasks against the HTTP model service, one run per task at a time.

use std::{collections::HashMap, sync::Arc};

use model_service_client::{ClientError, HttpModelService};
use retrain_policy::{
    config::Settings,
    tasks::{TaskContext, TaskKind, TaskReport, run_task},
};
use tokio::sync::Mutex;
use tracing::warn;

/// Shared by every scheduled job.
///
/// Holds one in-flight guard per task: a tick that arrives while the previous run of
/// the same task is still going is dropped. Different tasks never wait on each other.
pub struct TaskRunner {
    service: HttpModelService,
    settings: Settings,
    in_flight: HashMap<TaskKind, Arc<Mutex<()>>>,
}

impl TaskRunner {
    pub fn new(settings: Settings) -> Result<Self, ClientError> {
        let service =
            HttpModelService::new(&settings.service.base_url, settings.service.task_timeout())?;
        let in_flight = TaskKind::ALL
            .into_iter()
            .map(|kind| (kind, Arc::new(Mutex::new(()))))
            .collect();
        Ok(Self {
            service,
            settings,
            in_flight,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Run `kind` now with its own call ceiling, ignoring the in-flight guard.
    pub async fn run_once(&self, kind: TaskKind, dry_run: bool) -> TaskReport {
        let service = self.service.with_timeout(kind.timeout(&self.settings));
        let ctx = TaskContext::new(&service, &self.settings).dry_run(dry_run);
        run_task(kind, &ctx).await
    }

    /// Scheduled invocation: skipped (`None`) if a run of `kind` is still in flight.
    pub async fn tick(&self, kind: TaskKind) -> Option<TaskReport> {
        let guard = self.in_flight.get(&kind)?;
        let Ok(_running) = guard.try_lock() else {
            warn!(task = %kind, "previous run still in flight, skipping this tick");
            return None;
        };
        Some(self.run_once(kind, false).await)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn runner(server: &MockServer) -> Arc<TaskRunner> {
        let mut settings = Settings::default();
        settings.service.base_url = server.uri();
        Arc::new(TaskRunner::new(settings).expect("runner"))
    }

    #[tokio::test]
    async fn overlapping_tick_of_same_task_is_skipped() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ingest"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(300)))
            .expect(1)
            .mount(&server)
            .await;

        let r = runner(&server);
        let (first, second) = tokio::join!(r.tick(TaskKind::Ingest), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            r.tick(TaskKind::Ingest).await
        });

        assert!(first.expect("first tick runs").is_ok());
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn different_tasks_run_concurrently() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ingest"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(300)))
            .expect(1)
            .mount(&server)
            .await;
        for p in ["/train", "/series/rebuild", "/futures/update"] {
            Mock::given(method("POST"))
                .and(path(p))
                .respond_with(ResponseTemplate::new(200))
                .expect(1)
                .mount(&server)
                .await;
        }

        let r = runner(&server);
        let (ingest, train) = tokio::join!(r.tick(TaskKind::Ingest), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            r.tick(TaskKind::TrainDaily).await
        });

        assert!(ingest.expect("ingest runs").is_ok());
        assert!(train.expect("train runs").is_ok());
    }

    #[tokio::test]
    async fn unreachable_service_is_reported_not_raised() {
        let server = MockServer::start().await;
        let r = runner(&server);
        drop(server);

        let report = r.tick(TaskKind::Ingest).await.expect("tick runs");
        assert!(!report.is_ok());
        // guard released after a failed run
        assert!(r.tick(TaskKind::Ingest).await.is_some());
    }
}
