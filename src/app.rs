use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use crate::config::Config;
use crate::errors::ClientResult;
use crate::resources::{JobsResource, UploadResource};
use crate::services::{ApiClient, AuthContext, AuthState, Navigator, Route, SessionStore};

/// Application root. Owns the one session, the client built on it, the auth
/// context every page reads from and the navigator; pages borrow from here.
pub struct App {
    config: Config,
    api: ApiClient,
    auth: AuthContext,
    navigator: Navigator,
    lifetime: CancellationToken,
}

impl App {
    pub fn new(config: Config) -> ClientResult<Self> {
        let session = Arc::new(SessionStore::open(&config.session.token_file));
        Self::with_session(config, session)
    }

    pub fn with_session(config: Config, session: Arc<SessionStore>) -> ClientResult<Self> {
        let api = ApiClient::new(&config.api, session)?;
        let navigator = Navigator::new(Route::Landing);
        let auth = AuthContext::new(api.clone(), navigator.clone());

        Ok(Self {
            config,
            api,
            auth,
            navigator,
            lifetime: CancellationToken::new(),
        })
    }

    /// Runs the identity check the auth context performs when it mounts.
    pub async fn start(&self) -> AuthState {
        tracing::debug!("Starting against {}", self.api.base_url());
        self.auth.check_auth().await
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn auth(&self) -> &AuthContext {
        &self.auth
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        self.api.session()
    }

    // Resources get a child token: unmounting one view leaves the rest alive
    pub fn jobs_resource(&self) -> JobsResource {
        JobsResource::new(self.api.clone(), self.lifetime.child_token())
    }

    /// Jobs resource with its initial fetch already done.
    pub async fn mount_jobs(&self) -> JobsResource {
        JobsResource::mount(self.api.clone(), self.lifetime.child_token()).await
    }

    pub fn upload_resource(&self) -> UploadResource {
        UploadResource::new(
            self.api.clone(),
            self.config.upload.clone(),
            self.lifetime.child_token(),
        )
    }

    /// Cancels every resource still mounted under this root.
    pub fn shutdown(&self) {
        self.lifetime.cancel();
    }
}
