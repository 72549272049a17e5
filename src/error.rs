//! Error handling and custom error types
//!
//! Provides unified error handling across the job using thiserror. Only
//! validation and listing failures abort a job; everything else is recorded
//! against the object that caused it.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid job description: {0}")]
    Validation(String),

    #[error("Listing error: {0}")]
    Listing(String),

    #[error("Download error: {0}")]
    Download(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error(
        "Image {width}x{height} is smaller than the target {target_width}x{target_height}"
    )]
    InsufficientDimensions {
        width: u32,
        height: u32,
        target_width: u32,
        target_height: u32,
    },

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Upload error: {0}")]
    Upload(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] dotenvy::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invariant violated: {0}")]
    Invariant(String),
}

impl Error {
    /// Short stable label used in per-object outcomes.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Validation(_) => "validation",
            Error::Listing(_) => "listing",
            Error::Download(_) => "download",
            Error::Decode(_) => "decode",
            Error::InvalidImage(_) => "invalid_image",
            Error::InsufficientDimensions { .. } => "insufficient_dimensions",
            Error::Encode(_) => "encode",
            Error::Upload(_) => "upload",
            Error::Io(_) => "io",
            Error::Serialization(_) => "serialization",
            Error::EnvVar(_) => "env_var",
            Error::Config(_) => "config",
            Error::Invariant(_) => "invariant",
        }
    }

    pub fn is_job_fatal(&self) -> bool {
        matches!(self, Error::Validation(_) | Error::Listing(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
