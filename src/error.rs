use crate::services::api_client::ClientError;
use crate::services::view_machine::TransitionError;
use serde::Serialize;
use std::fmt;

/// Failure classes the view distinguishes when reporting an error.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Service unreachable, timed out, or answered with a non-success status.
    Transport,
    /// Response body did not have the expected shape.
    Payload,
    /// The user handed us something we cannot use (non-image file, blank label).
    Input,
    /// The intent is not available in the current view state.
    State,
    /// Bad start-up configuration.
    Config,
    Io,
}

#[derive(Debug, Serialize, Clone)]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        AppError {
            kind,
            message: message.into(),
        }
    }

    pub fn input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Input, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        AppError {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<TransitionError> for AppError {
    fn from(err: TransitionError) -> Self {
        AppError {
            kind: ErrorKind::State,
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError {
            kind: ErrorKind::Io,
            message: err.to_string(),
        }
    }
}

impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        AppError {
            kind: ErrorKind::Input,
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::from(err).into()
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError {
            kind: ErrorKind::State,
            message: msg,
        }
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError {
            kind: ErrorKind::State,
            message: msg.to_string(),
        }
    }
}
