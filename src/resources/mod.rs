//! Page-bound holders of backend data. Each one lives as long as the view
//! that mounted it: unmounting cancels its token, after which in-flight
//! results are discarded and no state is touched.

mod jobs;
mod upload;

pub use jobs::{JobsResource, JobsState};
pub use upload::{UploadResource, UploadState};

use std::future::Future;
use tokio_util::sync::CancellationToken;
use crate::errors::{ApiResponse, ClientError, ClientResult};

// Helper function to race a backend call against the owning view's lifetime
pub(crate) async fn until_cancelled<T>(
    cancel: &CancellationToken,
    call: impl Future<Output = ApiResponse<T>>,
) -> ClientResult<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ClientError::Cancelled),
        response = call => {
            if cancel.is_cancelled() {
                return Err(ClientError::Cancelled);
            }
            response.into_result()
        }
    }
}
