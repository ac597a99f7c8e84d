use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use meshport::handlers::{self, Page};
use meshport::{App, Config};

#[derive(Parser)]
#[command(name = "meshport", version, about = "Convert point clouds to 3D meshes in the cloud")]
struct Cli {
    /// Backend base URL (overrides MESHPORT_API_URL and config files)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Show the landing page
    Home,
    /// Sign in and store the session token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "MESHPORT_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Create an account
    Register {
        #[arg(long)]
        email: String,
        #[arg(long, env = "MESHPORT_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Forget the stored session token
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List your conversion jobs
    Dashboard,
    /// Inspect and manage individual jobs
    Jobs {
        #[command(subcommand)]
        action: JobsCommand,
    },
    /// Upload a point cloud and queue its conversion
    Upload { path: PathBuf },
    /// Download a stored file
    Download {
        filename: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum JobsCommand {
    /// Show one job
    Show { id: i64 },
    /// Queue a conversion for an already uploaded file
    Create { input_key: String },
    /// Delete a job
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("meshport=warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(api_url) = cli.api_url {
        config.api.base_url = api_url;
    }

    let app = App::new(config).context("Failed to initialise client")?;
    app.start().await;

    let page = match cli.command.unwrap_or(Command::Home) {
        Command::Home => handlers::serve_landing(&app),
        Command::Login { email, password } => {
            let password = password_or_prompt(password)?;
            handlers::handle_login(&app, &email, &password).await?
        }
        Command::Register { email, password } => {
            let password = password_or_prompt(password)?;
            handlers::handle_register(&app, &email, &password).await?
        }
        Command::Logout => handlers::handle_logout(&app),
        Command::Whoami => handlers::serve_whoami(&app).await?,
        Command::Dashboard => handlers::serve_dashboard(&app).await?,
        Command::Jobs { action } => match action {
            JobsCommand::Show { id } => handlers::view_job(&app, id).await?,
            JobsCommand::Create { input_key } => handlers::create_job(&app, &input_key).await?,
            JobsCommand::Delete { id, yes } => {
                handlers::delete_job(&app, id, |id| yes || confirm_delete(id)).await?
            }
        },
        Command::Upload { path } => handlers::process_upload(&app, &path, progress_bar()).await?,
        Command::Download { filename, output } => {
            let destination = output.unwrap_or_else(|| PathBuf::from(&filename));
            handlers::download_file(&app, &filename, &destination).await?
        }
    };

    app.shutdown();

    match page {
        Page::Content(text) => {
            print!("{}", text);
            Ok(())
        }
        Page::Redirect(route) => {
            eprintln!("Not signed in. Run `meshport login --email <email>` first ({}).", route);
            std::process::exit(1);
        }
    }
}

fn password_or_prompt(password: Option<String>) -> Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }
    eprint!("Password: ");
    io::stderr().flush()?;
    read_line()
}

fn confirm_delete(id: i64) -> bool {
    eprint!("Delete job {}? This cannot be undone [y/N]: ", id);
    if io::stderr().flush().is_err() {
        return false;
    }
    matches!(read_line().as_deref().map(str::trim), Ok("y") | Ok("Y") | Ok("yes"))
}

fn read_line() -> Result<String> {
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn progress_bar() -> ProgressBar {
    if !io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(100);
    if let Ok(style) = ProgressStyle::with_template("uploading [{bar:40}] {pos:>3}%") {
        bar.set_style(style.progress_chars("#>."));
    }
    bar
}
