use serde::{Deserialize, Serialize};

// Body returned by POST /api/upload; the backend queues a job for the file
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UploadResponse {
    pub message: String,
    pub filename: String,
    pub unique_filename: String,
    pub job_id: i64,
    pub file_size: u64,
    pub file_path: String,
}
