use crate::models::User;
use crate::services::{AuthContext, AuthState, Navigator, Route};

pub const LOADING_PLACEHOLDER: &str = "Checking authentication...";

#[derive(Debug, Clone, PartialEq)]
pub enum Guarded {
    // Identity check still in flight: show the placeholder, never the page
    Loading,
    // Visitor is not signed in and has been sent elsewhere: show nothing
    Redirected(Route),
    Allowed(User),
}

/// Gate in front of a protected page, created once per mount.
///
/// An unauthenticated visitor is redirected exactly once for the lifetime of
/// the guard, however many times it is evaluated.
pub struct RouteGuard {
    redirect_to: Route,
    redirected: bool,
}

impl RouteGuard {
    pub fn new() -> Self {
        Self::redirecting_to(Route::Login)
    }

    pub fn redirecting_to(redirect_to: Route) -> Self {
        Self { redirect_to, redirected: false }
    }

    pub fn evaluate(&mut self, state: &AuthState, navigator: &Navigator) -> Guarded {
        match state {
            AuthState::Unknown | AuthState::Checking => Guarded::Loading,
            AuthState::Authenticated(user) => Guarded::Allowed(user.clone()),
            AuthState::Unauthenticated => {
                if !self.redirected {
                    tracing::info!("Not signed in, redirecting to {}", self.redirect_to);
                    navigator.push(self.redirect_to);
                    self.redirected = true;
                }
                Guarded::Redirected(self.redirect_to)
            }
        }
    }

    /// Waits for the identity check to settle, then evaluates. A mount that
    /// finds no check started runs it itself.
    pub async fn resolve(&mut self, auth: &AuthContext, navigator: &Navigator) -> Guarded {
        auth.ensure_checked().await;
        let mut rx = auth.subscribe();
        let state = match rx.wait_for(|state| !state.is_loading()).await {
            Ok(state) => state.clone(),
            // Context gone while checking; nothing can ever authenticate this mount
            Err(_) => AuthState::Unauthenticated,
        };
        self.evaluate(&state, navigator)
    }
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new()
    }
}
