use bytes::Bytes;
use reqwest::Response;
use serde::de::DeserializeOwned;
use serde_json::Value;
use crate::errors::{ClientError, ClientResult};

/// Uniform outcome of every backend call: either the decoded payload with the
/// HTTP status it arrived with, or a failure whose `Display` is the
/// human-readable message to show the user.
#[derive(Debug)]
pub enum ApiResponse<T> {
    Success { status: u16, data: T },
    Failure(ClientError),
}

impl<T> ApiResponse<T> {
    pub fn status(&self) -> u16 {
        match self {
            ApiResponse::Success { status, .. } => *status,
            ApiResponse::Failure(err) => err.status(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ApiResponse::Success { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            ApiResponse::Success { data, .. } => Some(data),
            ApiResponse::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<String> {
        match self {
            ApiResponse::Success { .. } => None,
            ApiResponse::Failure(err) => Some(err.to_string()),
        }
    }

    pub fn into_result(self) -> ClientResult<T> {
        match self {
            ApiResponse::Success { data, .. } => Ok(data),
            ApiResponse::Failure(err) => Err(err),
        }
    }
}

impl<T> From<ClientError> for ApiResponse<T> {
    fn from(err: ClientError) -> Self {
        ApiResponse::Failure(err)
    }
}

// Converts a transport result carrying a JSON body into the uniform shape.
pub(crate) async fn json_response<T: DeserializeOwned>(
    sent: Result<Response, reqwest::Error>,
    fallback: &str,
) -> ApiResponse<T> {
    let response = match check_status(sent, fallback).await {
        Ok(response) => response,
        Err(err) => return err.into(),
    };

    let status = response.status().as_u16();
    match response.json::<T>().await {
        Ok(data) => ApiResponse::Success { status, data },
        Err(e) if e.is_decode() => {
            tracing::error!("Failed to decode response body (HTTP {}): {}", status, e);
            ClientError::Decode { status }.into()
        }
        Err(e) => ClientError::Connection(e).into(),
    }
}

// Converts a transport result carrying a binary body into the uniform shape.
pub(crate) async fn bytes_response(
    sent: Result<Response, reqwest::Error>,
    fallback: &str,
) -> ApiResponse<Bytes> {
    let response = match check_status(sent, fallback).await {
        Ok(response) => response,
        Err(err) => return err.into(),
    };

    let status = response.status().as_u16();
    match response.bytes().await {
        Ok(data) => ApiResponse::Success { status, data },
        Err(e) => ClientError::Connection(e).into(),
    }
}

// Helper function to split transport failures and non-2xx answers from usable responses
async fn check_status(
    sent: Result<Response, reqwest::Error>,
    fallback: &str,
) -> ClientResult<Response> {
    let response = sent.map_err(|e| {
        tracing::warn!("No response from backend: {}", e);
        ClientError::Connection(e)
    })?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = match response.bytes().await {
        Ok(body) => backend_message(&body).unwrap_or_else(|| fallback.to_string()),
        Err(e) => {
            tracing::debug!("Failed to read error body: {}", e);
            fallback.to_string()
        }
    };
    tracing::debug!("Backend rejected request with HTTP {}: {}", status, message);

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Extracts the backend's error text from a `{"detail": ...}` body.
///
/// A string detail is returned verbatim; a list of validation entries is
/// flattened into their `msg` fields.
pub fn backend_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    match value.get("detail")? {
        Value::String(detail) if !detail.is_empty() => Some(detail.clone()),
        Value::Array(entries) => {
            let messages: Vec<&str> = entries
                .iter()
                .filter_map(|entry| entry.get("msg").and_then(Value::as_str))
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => None,
    }
}
