use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use crate::errors::{ClientError, ClientResult};
use crate::models::{Job, JobCreateRequest};
use crate::services::ApiClient;
use super::until_cancelled;

#[derive(Debug, Clone, PartialEq)]
pub struct JobsState {
    pub jobs: Vec<Job>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl Default for JobsState {
    fn default() -> Self {
        Self { jobs: Vec::new(), is_loading: true, error: None }
    }
}

/// Cached view of the user's jobs.
///
/// The list is only ever replaced wholesale by a successful fetch; creating
/// or deleting a job goes through the backend and is followed by a full
/// refetch.
pub struct JobsResource {
    api: ApiClient,
    state: watch::Sender<JobsState>,
    cancel: CancellationToken,
}

impl JobsResource {
    pub fn new(api: ApiClient, cancel: CancellationToken) -> Self {
        Self {
            api,
            state: watch::Sender::new(JobsState::default()),
            cancel,
        }
    }

    /// Creates the resource and runs its initial fetch. A failed fetch is
    /// recorded in the state rather than returned.
    pub async fn mount(api: ApiClient, cancel: CancellationToken) -> Self {
        let resource = Self::new(api, cancel);
        if let Err(e) = resource.fetch_jobs().await {
            tracing::debug!("Initial job fetch did not complete: {}", e);
        }
        resource
    }

    pub fn unmount(&self) {
        self.cancel.cancel();
    }

    pub fn snapshot(&self) -> JobsState {
        self.state.borrow().clone()
    }

    pub fn jobs(&self) -> Vec<Job> {
        self.state.borrow().jobs.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<JobsState> {
        self.state.subscribe()
    }

    pub async fn fetch_jobs(&self) -> ClientResult<()> {
        self.update(|state| {
            state.is_loading = true;
            state.error = None;
        })?;

        match until_cancelled(&self.cancel, self.api.list_jobs()).await {
            Ok(jobs) => {
                tracing::debug!("Fetched {} jobs", jobs.len());
                self.update(|state| {
                    state.jobs = jobs;
                    state.is_loading = false;
                })
            }
            Err(ClientError::Cancelled) => Err(ClientError::Cancelled),
            Err(e) => {
                tracing::warn!("Failed to fetch jobs: {}", e);
                let message = e.to_string();
                self.update(|state| {
                    state.error = Some(message);
                    state.is_loading = false;
                })?;
                Err(e)
            }
        }
    }

    pub async fn create_job(&self, input_key: &str) -> ClientResult<Job> {
        let request = JobCreateRequest { input_key: input_key.to_string() };
        let job = until_cancelled(&self.cancel, self.api.create_job(&request)).await?;
        tracing::info!("Created job {} for {}", job.id, input_key);
        self.refresh_after_mutation().await?;
        Ok(job)
    }

    pub async fn delete_job(&self, job_id: i64) -> ClientResult<()> {
        let response = until_cancelled(&self.cancel, self.api.delete_job(job_id)).await?;
        tracing::info!("Deleted job {}: {}", job_id, response.message);
        self.refresh_after_mutation().await
    }

    // The mutation itself succeeded; a failed refresh only shows up in the state
    async fn refresh_after_mutation(&self) -> ClientResult<()> {
        match self.fetch_jobs().await {
            Err(ClientError::Cancelled) => Err(ClientError::Cancelled),
            _ => Ok(()),
        }
    }

    fn update(&self, apply: impl FnOnce(&mut JobsState)) -> ClientResult<()> {
        if self.cancel.is_cancelled() {
            return Err(ClientError::Cancelled);
        }
        self.state.send_modify(apply);
        Ok(())
    }
}

impl Drop for JobsResource {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
