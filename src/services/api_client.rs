use bytes::Bytes;
use futures::TryStreamExt;
use reqwest::{header, Method, RequestBuilder};
use reqwest::multipart::{Form, Part};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::io::ReaderStream;
use crate::config::ApiConfig;
use crate::errors::{ClientError, ClientResult};
use crate::errors::response::{bytes_response, json_response, ApiResponse};
use crate::models::{
    Job, JobCreateRequest, LoginRequest, MessageResponse, RegisterRequest, Token,
    UploadResponse, User,
};
use crate::services::SessionStore;

/// Callback receiving `(bytes_sent, total_bytes)` while an upload streams out.
pub type ProgressFn = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// HTTP client for the conversion backend.
///
/// Every call goes out as a single request carrying the session's bearer
/// token when one is held, and comes back as an [`ApiResponse`]. No call is
/// retried.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    session: Arc<SessionStore>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, session: Arc<SessionStore>) -> ClientResult<Self> {
        reqwest::Url::parse(&config.base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;

        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(ClientError::Connection)?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub async fn login(&self, credentials: &LoginRequest) -> ApiResponse<Token> {
        tracing::info!("Login attempt for user: {}", credentials.email);
        let sent = self.json_request(Method::POST, "/auth/login").json(credentials).send().await;
        let response: ApiResponse<Token> = json_response(sent, "Login failed").await;

        if let ApiResponse::Success { data, .. } = &response {
            // A credential that cannot be kept is not a usable session; the
            // previous one stays in place
            if let Err(e) = self.session.set_token(&data.access_token) {
                tracing::warn!("Login for {} not kept: {}", credentials.email, e);
                return e.into();
            }
            tracing::info!("Session established for user: {}", credentials.email);
        }
        response
    }

    pub async fn register(&self, details: &RegisterRequest) -> ApiResponse<User> {
        tracing::info!("Registering user: {}", details.email);
        let sent = self.json_request(Method::POST, "/auth/register").json(details).send().await;
        json_response(sent, "Registration failed").await
    }

    pub async fn current_user(&self) -> ApiResponse<User> {
        let sent = self.json_request(Method::GET, "/auth/me").send().await;
        json_response(sent, "Failed to load user").await
    }

    pub async fn list_jobs(&self) -> ApiResponse<Vec<Job>> {
        let sent = self.json_request(Method::GET, "/api/jobs").send().await;
        json_response(sent, "Failed to load jobs").await
    }

    pub async fn get_job(&self, job_id: i64) -> ApiResponse<Job> {
        let sent = self
            .json_request(Method::GET, &format!("/api/jobs/{}", job_id))
            .send()
            .await;
        json_response(sent, "Failed to load job").await
    }

    pub async fn create_job(&self, job: &JobCreateRequest) -> ApiResponse<Job> {
        tracing::debug!("Creating job for input: {}", job.input_key);
        let sent = self.json_request(Method::POST, "/api/jobs").json(job).send().await;
        json_response(sent, "Failed to create job").await
    }

    pub async fn delete_job(&self, job_id: i64) -> ApiResponse<MessageResponse> {
        tracing::debug!("Deleting job: {}", job_id);
        let sent = self
            .json_request(Method::DELETE, &format!("/api/jobs/{}", job_id))
            .send()
            .await;
        json_response(sent, "Failed to delete job").await
    }

    pub async fn upload_file(&self, path: &Path) -> ApiResponse<UploadResponse> {
        self.upload_file_with_progress(path, Arc::new(|_: u64, _: u64| {})).await
    }

    /// Streams `path` to `POST /api/upload` as the multipart field `file`,
    /// reporting bytes as they are handed to the transport.
    pub async fn upload_file_with_progress(
        &self,
        path: &Path,
        on_progress: ProgressFn,
    ) -> ApiResponse<UploadResponse> {
        let file = match tokio::fs::File::open(path).await {
            Ok(file) => file,
            Err(e) => {
                tracing::error!("Failed to open {} for upload: {}", path.display(), e);
                return ClientError::Io(e).into();
            }
        };
        let total = match file.metadata().await {
            Ok(metadata) => metadata.len(),
            Err(e) => return ClientError::Io(e).into(),
        };
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload")
            .to_string();

        tracing::info!("Uploading {} ({} bytes)", filename, total);

        let mut sent_bytes = 0u64;
        let stream = ReaderStream::new(file).inspect_ok(move |chunk| {
            sent_bytes += chunk.len() as u64;
            on_progress(sent_bytes, total);
        });
        let part = Part::stream_with_length(reqwest::Body::wrap_stream(stream), total)
            .file_name(filename);
        let form = Form::new().part("file", part);

        // Multipart sets its own content type, so only the credential is attached
        let sent = self
            .authorized(self.http.post(self.url("/api/upload")))
            .multipart(form)
            .send()
            .await;
        json_response(sent, "Failed to upload file").await
    }

    pub async fn download_file(&self, filename: &str) -> ApiResponse<Bytes> {
        tracing::debug!("Downloading file: {}", filename);
        let endpoint = format!("/api/files/{}", urlencoding::encode(filename));
        let sent = self.authorized(self.http.get(self.url(&endpoint))).send().await;
        bytes_response(sent, "Failed to download file").await
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    // Helper function to attach the bearer credential when the session holds one
    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn json_request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, self.url(endpoint))
            .header(header::CONTENT_TYPE, "application/json");
        self.authorized(builder)
    }
}
