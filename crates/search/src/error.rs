use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid summary tree: {0}")]
    SummaryFormat(#[from] serde_json::Error),

    #[error("Oracle error: {0}")]
    OracleError(#[from] specaudit_oracle::OracleError),

    #[error("Syntax error: {0}")]
    SyntaxError(#[from] specaudit_syntax::SyntaxError),
}
