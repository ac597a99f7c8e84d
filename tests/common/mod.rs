// In-process stand-in for the conversion backend, speaking the same JSON
// shapes and error bodies. Every request is recorded for assertions.
#![allow(dead_code)]

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use meshport::models::{Job, JobStatus, User};
use meshport::services::{ApiClient, SessionStore};
use meshport::{App, Config};

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
}

#[derive(Default)]
struct MockState {
    users: Mutex<Vec<(String, User)>>,
    jobs: Mutex<Vec<Job>>,
    files: Mutex<HashMap<String, Vec<u8>>>,
    requests: Mutex<Vec<Recorded>>,
    fail_next: Mutex<Option<(StatusCode, String)>>,
    delay: Mutex<Option<Duration>>,
    next_id: AtomicI64,
}

type Shared = Arc<MockState>;

pub struct MockBackend {
    pub base_url: String,
    state: Shared,
    token_dir: tempfile::TempDir,
}

impl MockBackend {
    pub async fn start() -> Self {
        let state = Shared::default();
        state.next_id.store(1, Ordering::SeqCst);

        let router = Router::new()
            .route("/auth/login", post(login))
            .route("/auth/register", post(register))
            .route("/auth/me", get(me))
            .route("/api/jobs", get(list_jobs).post(create_job))
            .route("/api/jobs/:id", get(get_job).delete(delete_job))
            .route("/api/upload", post(upload))
            .route("/api/files/:filename", get(download))
            .layer(middleware::from_fn_with_state(state.clone(), record))
            .layer(DefaultBodyLimit::disable())
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
            token_dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn config(&self) -> Config {
        Config::with_base_url(&self.base_url, self.token_path())
    }

    pub fn token_path(&self) -> PathBuf {
        self.token_dir.path().join("token")
    }

    pub fn api(&self, session: Arc<SessionStore>) -> ApiClient {
        ApiClient::new(&self.config().api, session).unwrap()
    }

    pub fn app(&self, session: Arc<SessionStore>) -> App {
        App::with_session(self.config(), session).unwrap()
    }

    pub fn add_user(&self, email: &str, password: &str) -> User {
        let user = User {
            id: self.state.next_id.fetch_add(1, Ordering::SeqCst),
            email: email.to_string(),
            is_active: true,
            is_verified: false,
            created_at: Utc::now(),
        };
        self.state
            .users
            .lock()
            .unwrap()
            .push((password.to_string(), user.clone()));
        user
    }

    pub fn add_job(&self, user_id: i64, input_key: &str, status: JobStatus) -> Job {
        self.state.add_job(user_id, input_key, status)
    }

    pub fn remove_job(&self, job_id: i64) {
        self.state.jobs.lock().unwrap().retain(|job| job.id != job_id);
    }

    pub fn add_file(&self, name: &str, contents: &[u8]) {
        self.state
            .files
            .lock()
            .unwrap()
            .insert(name.to_string(), contents.to_vec());
    }

    pub fn fail_next(&self, status: StatusCode, body: &str) {
        *self.state.fail_next.lock().unwrap() = Some((status, body.to_string()));
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.state.delay.lock().unwrap() = Some(delay);
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn count(&self, method: &str, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }
}

pub fn bearer(email: &str) -> String {
    format!("Bearer token-{}", email)
}

impl MockState {
    fn add_job(&self, user_id: i64, input_key: &str, status: JobStatus) -> Job {
        let job = Job {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            user_id,
            input_key: Some(input_key.to_string()),
            output_key: None,
            status,
            progress: 0,
            error: None,
            task_id: None,
            created_at: Utc::now(),
            finished_at: None,
        };
        self.jobs.lock().unwrap().push(job.clone());
        job
    }

    fn authed(&self, headers: &HeaderMap) -> Result<User, Response> {
        let presented = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        self.users
            .lock()
            .unwrap()
            .iter()
            .map(|(_, user)| user)
            .find(|user| bearer(&user.email) == presented)
            .cloned()
            .ok_or_else(|| detail(StatusCode::UNAUTHORIZED, "Could not validate credentials"))
    }
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

fn header_value(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn record(State(state): State<Shared>, req: Request, next: Next) -> Response {
    let recorded = Recorded {
        method: req.method().to_string(),
        path: req.uri().path().to_string(),
        authorization: header_value(req.headers(), header::AUTHORIZATION),
        content_type: header_value(req.headers(), header::CONTENT_TYPE),
    };
    state.requests.lock().unwrap().push(recorded);

    let delay = *state.delay.lock().unwrap();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let injected = state.fail_next.lock().unwrap().take();
    if let Some((status, body)) = injected {
        return (status, body).into_response();
    }
    next.run(req).await
}

#[derive(Deserialize)]
struct Credentials {
    email: String,
    password: String,
}

async fn login(State(state): State<Shared>, Json(body): Json<Credentials>) -> Response {
    let users = state.users.lock().unwrap();
    match users
        .iter()
        .find(|(password, user)| user.email == body.email && *password == body.password)
    {
        Some((_, user)) => Json(json!({
            "access_token": format!("token-{}", user.email),
            "token_type": "bearer"
        }))
        .into_response(),
        None => detail(StatusCode::UNAUTHORIZED, "Incorrect email or password"),
    }
}

async fn register(State(state): State<Shared>, Json(body): Json<Credentials>) -> Response {
    let exists = state
        .users
        .lock()
        .unwrap()
        .iter()
        .any(|(_, user)| user.email == body.email);
    if exists {
        return detail(StatusCode::BAD_REQUEST, "Email already registered");
    }

    let user = User {
        id: state.next_id.fetch_add(1, Ordering::SeqCst),
        email: body.email,
        is_active: true,
        is_verified: false,
        created_at: Utc::now(),
    };
    state
        .users
        .lock()
        .unwrap()
        .push((body.password, user.clone()));
    Json(user).into_response()
}

async fn me(State(state): State<Shared>, headers: HeaderMap) -> Response {
    match state.authed(&headers) {
        Ok(user) => Json(user).into_response(),
        Err(response) => response,
    }
}

async fn list_jobs(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let user = match state.authed(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let jobs: Vec<Job> = state
        .jobs
        .lock()
        .unwrap()
        .iter()
        .filter(|job| job.user_id == user.id)
        .cloned()
        .collect();
    Json(jobs).into_response()
}

async fn get_job(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    let user = match state.authed(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let job = state
        .jobs
        .lock()
        .unwrap()
        .iter()
        .find(|job| job.id == id && job.user_id == user.id)
        .cloned();
    match job {
        Some(job) => Json(job).into_response(),
        None => detail(StatusCode::NOT_FOUND, "Job not found"),
    }
}

#[derive(Deserialize)]
struct NewJob {
    input_key: String,
}

async fn create_job(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<NewJob>,
) -> Response {
    match state.authed(&headers) {
        Ok(user) => Json(state.add_job(user.id, &body.input_key, JobStatus::Queued)).into_response(),
        Err(response) => response,
    }
}

async fn delete_job(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let user = match state.authed(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let mut jobs = state.jobs.lock().unwrap();
    let before = jobs.len();
    jobs.retain(|job| !(job.id == id && job.user_id == user.id));
    if jobs.len() == before {
        return detail(StatusCode::NOT_FOUND, "Job not found");
    }
    Json(json!({ "message": "Job deleted successfully" })).into_response()
}

async fn upload(State(state): State<Shared>, headers: HeaderMap, mut multipart: Multipart) -> Response {
    let user = match state.authed(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };

    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload").to_string();
        let data = match field.bytes().await {
            Ok(data) => data,
            Err(e) => return detail(StatusCode::BAD_REQUEST, &e.to_string()),
        };

        let unique_filename = format!("{}-{}", state.next_id.load(Ordering::SeqCst), filename);
        let job = state.add_job(user.id, &unique_filename, JobStatus::Queued);
        state
            .files
            .lock()
            .unwrap()
            .insert(unique_filename.clone(), data.to_vec());

        return Json(json!({
            "message": "File uploaded successfully",
            "filename": filename,
            "unique_filename": unique_filename,
            "job_id": job.id,
            "file_size": data.len(),
            "file_path": format!("uploads/{}", unique_filename),
        }))
        .into_response();
    }

    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "detail": [{ "loc": ["body", "file"], "msg": "field required" }] })),
    )
        .into_response()
}

async fn download(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(filename): Path<String>,
) -> Response {
    if let Err(response) = state.authed(&headers) {
        return response;
    }
    match state.files.lock().unwrap().get(&filename) {
        Some(contents) => contents.clone().into_response(),
        None => detail(StatusCode::NOT_FOUND, "File not found"),
    }
}
