use crate::app::App;
use crate::errors::ClientResult;
use crate::services::Route;
use super::{pass_guard, Page};

pub async fn handle_login(app: &App, email: &str, password: &str) -> ClientResult<Page> {
    app.navigator().push(Route::Login);
    app.auth().login(email, password).await?;

    // The identity check that follows login may still reject the new token
    let user = app.auth().require_user().map_err(|e| {
        tracing::warn!("Login for {} succeeded but the account could not be loaded", email);
        e
    })?;

    app.navigator().push(Route::Dashboard);
    Ok(Page::Content(format!("Signed in as {}\n", user.email)))
}

pub async fn handle_register(app: &App, email: &str, password: &str) -> ClientResult<Page> {
    app.navigator().push(Route::Register);
    let user = app.auth().register(email, password).await?;

    app.navigator().push(Route::Login);
    Ok(Page::Content(format!(
        "Account created for {}. Sign in with `meshport login --email {}`\n",
        user.email, user.email
    )))
}

pub fn handle_logout(app: &App) -> Page {
    app.auth().logout();
    Page::Content("Signed out.\n".to_string())
}

pub async fn serve_whoami(app: &App) -> ClientResult<Page> {
    let user = match pass_guard(app).await {
        Ok(user) => user,
        Err(page) => return Ok(page),
    };

    Ok(Page::Content(format!(
        "{}\n  id:       {}\n  active:   {}\n  verified: {}\n  joined:   {}\n",
        user.email,
        user.id,
        if user.is_active { "yes" } else { "no" },
        if user.is_verified { "yes" } else { "no" },
        user.created_at.format("%Y-%m-%d"),
    )))
}
