mod user;
mod forms;
mod job;
mod upload;
pub mod timestamp;

pub use user::{User, Token};
pub use forms::{LoginRequest, RegisterRequest, JobCreateRequest};
pub use job::{Job, JobStatus, MessageResponse};
pub use upload::UploadResponse;
