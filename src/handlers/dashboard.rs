use std::path::Path;
use crate::app::App;
use crate::errors::{ClientError, ClientResult};
use crate::models::{Job, User};
use crate::resources::JobsState;
use crate::services::Route;
use super::{enter_protected, Page};

pub async fn serve_dashboard(app: &App) -> ClientResult<Page> {
    let user = match enter_protected(app, Route::Dashboard).await {
        Ok(user) => user,
        Err(page) => return Ok(page),
    };
    tracing::info!("Rendering dashboard for user: {}", user.email);

    let jobs = app.mount_jobs().await;
    Ok(Page::Content(render_dashboard(&user, &jobs.snapshot())))
}

pub async fn view_job(app: &App, job_id: i64) -> ClientResult<Page> {
    if let Err(page) = enter_protected(app, Route::Dashboard).await {
        return Ok(page);
    }

    let job = app.api().get_job(job_id).await.into_result()?;
    tracing::debug!("Found job {} with status: {:?}", job.id, job.status);
    Ok(Page::Content(render_job(&job)))
}

pub async fn create_job(app: &App, input_key: &str) -> ClientResult<Page> {
    let user = match enter_protected(app, Route::Dashboard).await {
        Ok(user) => user,
        Err(page) => return Ok(page),
    };

    let jobs = app.jobs_resource();
    let job = jobs.create_job(input_key).await?;

    let mut page = format!("Queued job {} for {}\n\n", job.id, input_key);
    page.push_str(&render_dashboard(&user, &jobs.snapshot()));
    Ok(Page::Content(page))
}

/// Deletes a job once `confirm` agrees, then shows the refreshed list.
pub async fn delete_job(
    app: &App,
    job_id: i64,
    confirm: impl FnOnce(i64) -> bool,
) -> ClientResult<Page> {
    let user = match enter_protected(app, Route::Dashboard).await {
        Ok(user) => user,
        Err(page) => return Ok(page),
    };

    if !confirm(job_id) {
        tracing::debug!("Deletion of job {} not confirmed", job_id);
        return Ok(Page::Content("Nothing deleted.\n".to_string()));
    }

    tracing::info!("Attempting to delete job {} for user {}", job_id, user.email);
    let jobs = app.jobs_resource();
    jobs.delete_job(job_id).await?;

    let mut page = format!("Deleted job {}\n\n", job_id);
    page.push_str(&render_dashboard(&user, &jobs.snapshot()));
    Ok(Page::Content(page))
}

pub async fn download_file(app: &App, filename: &str, destination: &Path) -> ClientResult<Page> {
    if let Err(page) = enter_protected(app, Route::Dashboard).await {
        return Ok(page);
    }

    let blob = app.api().download_file(filename).await.into_result()?;
    tokio::fs::write(destination, &blob).await.map_err(|e| {
        tracing::error!("Failed to write {}: {}", destination.display(), e);
        ClientError::Io(e)
    })?;

    tracing::info!("Saved {} ({} bytes) to {}", filename, blob.len(), destination.display());
    Ok(Page::Content(format!(
        "Saved {} bytes to {}\n",
        blob.len(),
        destination.display()
    )))
}

pub fn render_dashboard(user: &User, state: &JobsState) -> String {
    let mut page = format!("Dashboard ({})\n\n", user.email);

    if let Some(error) = &state.error {
        page.push_str(&format!("Error: {}\n\n", error));
    }

    if state.is_loading {
        page.push_str("Loading jobs...\n");
        return page;
    }

    if state.jobs.is_empty() {
        page.push_str("No jobs yet.\n");
        page.push_str("Upload your first point cloud to start a conversion: meshport upload <file>\n");
        return page;
    }

    page.push_str(&format!(
        "{:<6} {:<40} {:<11} {:<17} {:<10} {}\n",
        "ID", "FILE", "STATUS", "PROGRESS", "CREATED", "OUTPUT"
    ));
    for job in &state.jobs {
        page.push_str(&format!(
            "{:<6} {:<40} {:<11} {:<17} {:<10} {}\n",
            job.id,
            job.input_key.as_deref().unwrap_or("(no file)"),
            job.status.label(),
            progress_bar(job.progress),
            job.created_at.format("%Y-%m-%d"),
            job.downloadable_output().unwrap_or("-"),
        ));
    }
    page
}

fn render_job(job: &Job) -> String {
    let mut page = format!("Job {}\n", job.id);
    page.push_str(&format!("  file:     {}\n", job.input_key.as_deref().unwrap_or("(no file)")));
    page.push_str(&format!("  status:   {}\n", job.status));
    page.push_str(&format!("  progress: {}\n", progress_bar(job.progress)));
    page.push_str(&format!("  created:  {}\n", job.created_at.format("%Y-%m-%d %H:%M:%S")));
    if let Some(finished) = job.finished_at {
        page.push_str(&format!("  finished: {}\n", finished.format("%Y-%m-%d %H:%M:%S")));
    }
    if let Some(task_id) = &job.task_id {
        page.push_str(&format!("  task:     {}\n", task_id));
    }
    if let Some(output) = job.downloadable_output() {
        page.push_str(&format!("  output:   {} (meshport download {})\n", output, output));
    }
    if let Some(error) = &job.error {
        page.push_str(&format!("  error:    {}\n", error));
    }
    page
}

// Ten-cell bar followed by the percentage, e.g. "[####......] 40%"
fn progress_bar(progress: u8) -> String {
    let progress = progress.min(100);
    let filled = usize::from(progress / 10);
    format!("[{}{}] {}%", "#".repeat(filled), ".".repeat(10 - filled), progress)
}
