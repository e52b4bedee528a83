use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::controller::{Job, Outcome};
use crate::error::{AppError, AppResult};
use crate::google::Backend;

pub type Wake = Arc<dyn Fn() + Send + Sync>;

/// Runs jobs on a tokio runtime owned by a background thread. Each job gets
/// its own task, so a translation and a cleanup can overlap.
pub struct Worker {
    jobs: Sender<Job>,
    outcomes: Receiver<Outcome>,
}

impl Worker {
    pub fn spawn(backend: Arc<dyn Backend>, delay: Duration, wake: Option<Wake>) -> AppResult<Self> {
        let (job_tx, job_rx) = unbounded::<Job>();
        let (out_tx, out_rx) = unbounded::<Outcome>();
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .map_err(|e| AppError::Transport(format!("cannot start runtime: {e}")))?;

        thread::Builder::new()
            .name("ptcopyedit-worker".into())
            .spawn(move || {
                tracing::info!("worker thread started");
                while let Ok(job) = job_rx.recv() {
                    let backend = Arc::clone(&backend);
                    let out_tx = out_tx.clone();
                    let wake = wake.clone();
                    rt.spawn(async move {
                        let kind = job.kind();
                        let result = run(backend.as_ref(), job, delay).await;
                        if out_tx.send(Outcome { kind, result }).is_err() {
                            tracing::debug!(?kind, "outcome dropped, UI gone");
                        }
                        if let Some(wake) = wake {
                            wake();
                        }
                    });
                }
                tracing::info!("worker thread stopping");
            })
            .map_err(|e| AppError::Transport(format!("cannot start worker: {e}")))?;

        Ok(Self { jobs: job_tx, outcomes: out_rx })
    }

    pub fn submit(&self, job: Job) -> AppResult<()> {
        self.jobs
            .send(job)
            .map_err(|_| AppError::Transport("worker is not running".into()))
    }

    /// Outcomes finished since the last call, oldest first.
    pub fn drain(&self) -> Vec<Outcome> {
        self.outcomes.try_iter().collect()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<Outcome> {
        self.outcomes.recv_timeout(timeout).ok()
    }
}

/// The pause is deliberate UI pacing, not rate limiting.
pub async fn run(backend: &dyn Backend, job: Job, delay: Duration) -> AppResult<String> {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    match job {
        Job::Translate { project_id, credential, html } => {
            backend.translate(&project_id, &credential, &html).await
        }
        Job::Cleanup { project_id, credential, request } => {
            backend.generate(&project_id, &credential, &request).await
        }
    }
}
