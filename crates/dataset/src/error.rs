// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

/// Dataset error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A value or schema does not have the required type or field
    #[error("Type error: {0}")]
    Type(String),

    /// The operation is not supported for this source or construct
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// Malformed structural input
    #[error("Invalid: {0}")]
    Invalid(String),

    /// Filesystem listing or open failure
    #[error("Filesystem error: {0}")]
    FileSystem(#[from] pathforest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow_schema::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("DataFusion error: {0}")]
    DataFusion(#[from] datafusion::error::DataFusionError),

    /// Configuration could not be parsed
    #[error("Config error: {0}")]
    Config(#[from] serde_yaml_ng::Error),
}

impl Error {
    pub fn type_error<S: Into<String>>(message: S) -> Self {
        Error::Type(message.into())
    }

    pub fn not_implemented<S: Into<String>>(message: S) -> Self {
        Error::NotImplemented(message.into())
    }

    pub fn invalid<S: Into<String>>(message: S) -> Self {
        Error::Invalid(message.into())
    }

    #[must_use]
    pub fn is_type_error(&self) -> bool {
        matches!(self, Error::Type(_))
    }

    #[must_use]
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, Error::NotImplemented(_))
    }
}

/// Result type for dataset operations
pub type Result<T> = std::result::Result<T, Error>;
