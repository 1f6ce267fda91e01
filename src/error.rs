//! Crate error type

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("invalid settings file: {0}")]
    Config(#[from] serde_json::Error),

    #[error("could not determine a data directory for this platform")]
    NoDataDir,
}

pub type Result<T> = std::result::Result<T, Error>;
