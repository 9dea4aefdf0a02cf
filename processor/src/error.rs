use std::fmt::Debug;
use thiserror::Error;

use crate::exchange::DecodeError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing `{0}` environment variable")]
    MissingEnvVar(String),

    #[error("Event decode failed: {0}")]
    EventDecode(String),

    #[error("Unknown event topic: `{0}`")]
    UnknownEventTopic(String),

    #[error("Call decode failed: {0}")]
    CallDecode(#[from] DecodeError),

    #[error("Redis connection error: {0}")]
    RedisConnection(String),

    #[error("Redis publish error: {0}")]
    RedisPublish(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
