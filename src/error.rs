use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("failed to {action} tasks: {status} {body}")]
    Status {
        action: &'static str,
        status: StatusCode,
        body: String,
    },
    #[error("invalid task collection: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("tasks were never loaded from the store, press r to reload first")]
    NotLoaded,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("store_url is not set (config file or TODO_STORE_URL)")]
    MissingStoreUrl,
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Error, PartialEq)]
pub enum FormError {
    #[error("Task title cannot be empty.")]
    EmptyTitle,
    #[error("Unrecognised deadline: {0}")]
    InvalidDeadline(String),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("cannot start logger: {0}")]
    Logger(#[from] log::SetLoggerError),
}
