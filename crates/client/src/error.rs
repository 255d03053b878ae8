use std::path::PathBuf;

/// Errors from the API client and the upload queue.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed (network, DNS, TLS, body decoding).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    ///
    /// `error` is the server's message when the body is the usual JSON
    /// error shape, otherwise `"unexpected status code"`. `data` is the
    /// raw body.
    #[error("API error ({status}): {error}")]
    Api {
        status: u16,
        error: String,
        data: String,
    },

    /// A page file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The upload queue was cancelled before this item started.
    #[error("Upload cancelled")]
    Cancelled,
}

impl ClientError {
    /// Build the uniform failure for a non-2xx response.
    pub fn from_response_body(status: u16, data: String) -> Self {
        let error = serde_json::from_str::<serde_json::Value>(&data)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
            .unwrap_or_else(|| "unexpected status code".to_string());
        Self::Api {
            status,
            error,
            data,
        }
    }

    /// HTTP status of an API failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
