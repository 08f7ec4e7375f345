use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexError>;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Syntax error: {0}")]
    SyntaxError(#[from] specaudit_syntax::SyntaxError),

    #[error("Invalid project path: {0}")]
    InvalidPath(String),
}
