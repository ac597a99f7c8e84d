use std::fmt;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Landing,
    Login,
    Register,
    Dashboard,
    Upload,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Landing => "/",
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Dashboard => "/dashboard",
            Route::Upload => "/upload",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        match path {
            "/" => Some(Route::Landing),
            "/login" => Some(Route::Login),
            "/register" => Some(Route::Register),
            "/dashboard" => Some(Route::Dashboard),
            "/upload" => Some(Route::Upload),
            _ => None,
        }
    }

    // Same public set the web front end exposes without a session
    pub fn is_public(&self) -> bool {
        matches!(self, Route::Landing | Route::Login | Route::Register)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Current location of the application, owned by the root and shared by
/// handle with everything that needs to navigate.
#[derive(Clone)]
pub struct Navigator {
    current: Arc<watch::Sender<Route>>,
    history: Arc<Mutex<Vec<Route>>>,
}

impl Navigator {
    pub fn new(start: Route) -> Self {
        Self {
            current: Arc::new(watch::Sender::new(start)),
            history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn push(&self, route: Route) {
        tracing::debug!("Navigating to {}", route);
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(route);
        self.current.send_replace(route);
    }

    pub fn current(&self) -> Route {
        *self.current.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.current.subscribe()
    }

    /// Every route pushed since creation, oldest first.
    pub fn history(&self) -> Vec<Route> {
        self.history.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Route::Landing)
    }
}
