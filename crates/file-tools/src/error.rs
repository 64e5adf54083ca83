use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Invalid URL '{0}': {1}")]
    InvalidUrl(String, String),

    #[error("Invalid file name pattern '{0}': {1}")]
    InvalidPattern(String, String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("PDF operation failed: {0}")]
    Pdf(String),

    #[error("PDF is already encrypted: {0}")]
    AlreadyEncrypted(String),

    #[error("Page rendering failed: {0}")]
    Render(String),
}

impl From<lopdf::Error> for ToolError {
    fn from(e: lopdf::Error) -> Self {
        ToolError::Pdf(e.to_string())
    }
}

impl From<chromiumoxide::error::CdpError> for ToolError {
    fn from(e: chromiumoxide::error::CdpError) -> Self {
        ToolError::Render(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ToolError>;
