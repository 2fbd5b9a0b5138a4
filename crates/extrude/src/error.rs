use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtrudeError {
    #[error("Extrusion depth must be a positive finite number, got {0}")]
    InvalidDepth(f64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to move staged file into place: {0}")]
    Persist(std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed OBJ at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Export task failed: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, ExtrudeError>;
