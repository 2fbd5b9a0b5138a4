use thiserror::Error;

#[derive(Error, Debug)]
pub enum TraceError {
    #[error("Invalid trace configuration: {0}")]
    InvalidConfig(String),

    #[error("Shape detector '{name}' failed: {message}")]
    Detector { name: String, message: String },

    #[error("Trace worker failed: {0}")]
    Worker(String),
}

pub type Result<T> = std::result::Result<T, TraceError>;
