use shared::error::{ApiError, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("api error {status}: {message}")]
    Api {
        status: u16,
        code: ErrorCode,
        message: String,
    },
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("{0}")]
    Validation(String),
    #[error("not logged in")]
    NotAuthenticated,
    #[error("{0}")]
    Forbidden(String),
    #[error("no async runtime to run the view load")]
    NoRuntime,
}

impl ClientError {
    pub fn api(status: u16, body: &str) -> Self {
        let ApiError { code, message } = ApiError::from_response(status, body);
        ClientError::Api {
            status,
            code,
            message,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ClientError::Validation(message.into())
    }

    /// True when the backend no longer recognizes the session.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            ClientError::NotAuthenticated
                | ClientError::Api {
                    code: ErrorCode::Unauthorized,
                    ..
                }
        )
    }
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;
