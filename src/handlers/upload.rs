use indicatif::ProgressBar;
use std::path::Path;
use crate::app::App;
use crate::errors::ClientResult;
use crate::services::Route;
use super::{dashboard::render_dashboard, enter_protected, Page};

/// Uploads `path`, mirroring transfer progress onto `bar`, then refreshes the
/// job list and lands on the dashboard.
pub async fn process_upload(app: &App, path: &Path, bar: ProgressBar) -> ClientResult<Page> {
    let user = match enter_protected(app, Route::Upload).await {
        Ok(user) => user,
        Err(page) => return Ok(page),
    };

    let upload = app.upload_resource();
    let mut progress = upload.subscribe();
    bar.set_length(100);
    let watcher = {
        let bar = bar.clone();
        tokio::spawn(async move {
            while progress.changed().await.is_ok() {
                let percent = progress.borrow_and_update().progress;
                bar.set_position(u64::from(percent));
            }
        })
    };

    let result = upload.upload_file(path).await;
    watcher.abort();

    let response = match result {
        Ok(response) => {
            bar.finish_and_clear();
            response
        }
        Err(e) => {
            bar.abandon();
            return Err(e);
        }
    };

    // The backend queued a job for the file; show it straight away
    let jobs = app.jobs_resource();
    if let Err(e) = jobs.fetch_jobs().await {
        tracing::warn!("Job list refresh after upload failed: {}", e);
    }
    app.navigator().push(Route::Dashboard);

    let mut page = format!(
        "Uploaded {} ({:.2} MB) as {}\nConversion queued as job {}\n\n",
        response.filename,
        response.file_size as f64 / (1024.0 * 1024.0),
        response.unique_filename,
        response.job_id,
    );
    page.push_str(&render_dashboard(&user, &jobs.snapshot()));
    Ok(Page::Content(page))
}
