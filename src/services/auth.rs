use tokio::sync::watch;
use crate::errors::{ClientError, ClientResult};
use crate::models::{LoginRequest, RegisterRequest, User};
use crate::services::{ApiClient, Navigator, Route};

#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    Unknown,
    Checking,
    Authenticated(User),
    Unauthenticated,
}

impl AuthState {
    pub fn user(&self) -> Option<&User> {
        match self {
            AuthState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    /// True until the identity check has settled either way.
    pub fn is_loading(&self) -> bool {
        matches!(self, AuthState::Unknown | AuthState::Checking)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }
}

/// Who is signed in, shared with every page of the application.
///
/// Starts in [`AuthState::Unknown`]; [`check_auth`](Self::check_auth) moves it
/// through `Checking` to either `Authenticated` or `Unauthenticated`.
pub struct AuthContext {
    api: ApiClient,
    navigator: Navigator,
    state: watch::Sender<AuthState>,
}

impl AuthContext {
    pub fn new(api: ApiClient, navigator: Navigator) -> Self {
        Self {
            api,
            navigator,
            state: watch::Sender::new(AuthState::Unknown),
        }
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().user().cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// Resolves the current identity from the stored credential.
    ///
    /// Without a credential no request is made. A credential the backend
    /// refuses is dropped silently: the outcome is simply "not signed in".
    pub async fn check_auth(&self) -> AuthState {
        if !self.api.session().is_authenticated() {
            tracing::debug!("No stored credential, skipping identity check");
            self.state.send_replace(AuthState::Unauthenticated);
            return AuthState::Unauthenticated;
        }

        self.state.send_replace(AuthState::Checking);
        let next = match self.api.current_user().await.into_result() {
            Ok(user) => {
                tracing::info!("Authenticated as {}", user.email);
                AuthState::Authenticated(user)
            }
            Err(e) => {
                tracing::info!("Stored credential rejected ({}), clearing session", e);
                if let Err(e) = self.api.session().clear_token() {
                    tracing::warn!("Failed to clear rejected credential: {}", e);
                }
                AuthState::Unauthenticated
            }
        };

        self.state.send_replace(next.clone());
        next
    }

    /// Runs the identity check unless one has already started or settled.
    pub async fn ensure_checked(&self) -> AuthState {
        let current = self.state();
        if current == AuthState::Unknown {
            return self.check_auth().await;
        }
        current
    }

    pub async fn login(&self, email: &str, password: &str) -> ClientResult<()> {
        self.api
            .login(&LoginRequest::new(email, password))
            .await
            .into_result()?;
        self.check_auth().await;
        Ok(())
    }

    // Registration does not sign the user in
    pub async fn register(&self, email: &str, password: &str) -> ClientResult<User> {
        self.api
            .register(&RegisterRequest::new(email, password))
            .await
            .into_result()
    }

    pub fn logout(&self) {
        if let Err(e) = self.api.session().clear_token() {
            tracing::warn!("Failed to clear session on logout: {}", e);
        }
        self.state.send_replace(AuthState::Unauthenticated);
        tracing::info!("Signed out");
        self.navigator.push(Route::Landing);
    }

    /// Fails with [`ClientError::Unauthenticated`] unless a user is signed in.
    pub fn require_user(&self) -> ClientResult<User> {
        self.user().ok_or(ClientError::Unauthenticated)
    }
}
