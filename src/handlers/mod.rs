mod landing;
mod auth;
mod dashboard;
mod upload;

pub use landing::{serve_landing, render_landing};
pub use auth::{handle_login, handle_register, handle_logout, serve_whoami};
pub use dashboard::{serve_dashboard, render_dashboard, view_job, create_job, delete_job, download_file};
pub use upload::process_upload;

use crate::app::App;
use crate::middleware::{Guarded, RouteGuard};
use crate::models::User;
use crate::services::Route;

/// What a page produced: text to show, or a redirect it issued instead.
#[derive(Debug, Clone, PartialEq)]
pub enum Page {
    Content(String),
    Redirect(Route),
}

impl Page {
    pub fn content(&self) -> Option<&str> {
        match self {
            Page::Content(text) => Some(text),
            Page::Redirect(_) => None,
        }
    }
}

// Helper function to mount a protected page: navigate there, then pass its guard
async fn enter_protected(app: &App, route: Route) -> Result<User, Page> {
    app.navigator().push(route);
    pass_guard(app).await
}

// Guard only, for views that are not a route of their own
async fn pass_guard(app: &App) -> Result<User, Page> {
    let mut guard = RouteGuard::new();
    match guard.resolve(app.auth(), app.navigator()).await {
        Guarded::Allowed(user) => Ok(user),
        Guarded::Redirected(to) => Err(Page::Redirect(to)),
        Guarded::Loading => Err(Page::Redirect(Route::Login)),
    }
}
