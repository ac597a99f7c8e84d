use std::path::Path;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use crate::config::UploadConfig;
use crate::errors::{ClientError, ClientResult};
use crate::models::UploadResponse;
use crate::services::ApiClient;
use super::until_cancelled;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadState {
    pub is_uploading: bool,
    pub progress: u8,
    pub error: Option<String>,
}

/// Tracks one file upload at a time.
///
/// Progress reflects bytes actually handed to the HTTP transport. It stops
/// at 99 while the backend is still answering and only reaches 100 once the
/// upload has been accepted.
pub struct UploadResource {
    api: ApiClient,
    limits: UploadConfig,
    state: Arc<watch::Sender<UploadState>>,
    cancel: CancellationToken,
}

impl UploadResource {
    pub fn new(api: ApiClient, limits: UploadConfig, cancel: CancellationToken) -> Self {
        Self {
            api,
            limits,
            state: Arc::new(watch::Sender::new(UploadState::default())),
            cancel,
        }
    }

    pub fn unmount(&self) {
        self.cancel.cancel();
    }

    pub fn snapshot(&self) -> UploadState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<UploadState> {
        self.state.subscribe()
    }

    /// Checks extension and size against the configured limits and returns
    /// the file size.
    pub fn validate(&self, path: &Path) -> ClientResult<u64> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext.to_lowercase()))
            .unwrap_or_default();

        let allowed = self
            .limits
            .allowed_extensions
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(&extension));
        if !allowed {
            return Err(ClientError::InvalidFile(format!(
                "file type not allowed, supported formats: {}",
                self.limits.allowed_extensions.join(", ")
            )));
        }

        let metadata = std::fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(ClientError::InvalidFile(format!(
                "{} is not a regular file",
                path.display()
            )));
        }
        if metadata.len() > self.limits.max_file_size {
            return Err(ClientError::InvalidFile(format!(
                "file too large, maximum size is {}MB",
                self.limits.max_file_size / (1024 * 1024)
            )));
        }

        Ok(metadata.len())
    }

    pub async fn upload_file(&self, path: &Path) -> ClientResult<UploadResponse> {
        self.update(|state| {
            state.is_uploading = true;
            state.progress = 0;
            state.error = None;
        })?;

        if let Err(e) = self.validate(path) {
            tracing::warn!("Rejected {} before upload: {}", path.display(), e);
            self.fail(&e)?;
            return Err(e);
        }

        let state = self.state.clone();
        let cancel = self.cancel.clone();
        let on_progress = Arc::new(move |sent: u64, total: u64| {
            if cancel.is_cancelled() {
                return;
            }
            let percent = sent
                .saturating_mul(100)
                .checked_div(total)
                .unwrap_or(0)
                .min(99) as u8;
            state.send_if_modified(|current| {
                if percent > current.progress {
                    current.progress = percent;
                    true
                } else {
                    false
                }
            });
        });

        match until_cancelled(&self.cancel, self.api.upload_file_with_progress(path, on_progress)).await {
            Ok(response) => {
                tracing::info!(
                    "Upload accepted: {} queued as job {}",
                    response.filename,
                    response.job_id
                );
                self.update(|state| {
                    state.progress = 100;
                    state.is_uploading = false;
                })?;
                Ok(response)
            }
            Err(ClientError::Cancelled) => Err(ClientError::Cancelled),
            Err(e) => {
                tracing::error!("Upload of {} failed: {}", path.display(), e);
                self.fail(&e)?;
                Err(e)
            }
        }
    }

    pub fn reset(&self) {
        self.state.send_replace(UploadState::default());
    }

    fn fail(&self, err: &ClientError) -> ClientResult<()> {
        let message = err.to_string();
        self.update(|state| {
            state.error = Some(message);
            state.progress = 0;
            state.is_uploading = false;
        })
    }

    fn update(&self, apply: impl FnOnce(&mut UploadState)) -> ClientResult<()> {
        if self.cancel.is_cancelled() {
            return Err(ClientError::Cancelled);
        }
        self.state.send_modify(apply);
        Ok(())
    }
}

impl Drop for UploadResource {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
