//! Client for the point-cloud-to-mesh conversion service: session handling,
//! the authenticated API client, job and upload resources, and the pages the
//! `meshport` binary renders.

pub mod app;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod resources;
pub mod services;

pub use app::App;
pub use config::Config;
pub use errors::{ApiResponse, ClientError, ClientResult};
