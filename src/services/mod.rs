mod session_store;
mod api_client;
mod navigator;
mod auth;

pub use session_store::{SessionStore, TokenStorage, FileTokenStorage, MemoryTokenStorage};
pub use api_client::{ApiClient, ProgressFn};
pub use navigator::{Navigator, Route};
pub use auth::{AuthContext, AuthState};
