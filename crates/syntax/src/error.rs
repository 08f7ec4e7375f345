use thiserror::Error;

/// Result type for syntax operations
pub type Result<T> = std::result::Result<T, SyntaxError>;

/// Errors that can occur while parsing sources
#[derive(Error, Debug)]
pub enum SyntaxError {
    /// Tree-sitter returned no tree for the input
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Grammar could not be loaded into the parser
    #[error("Tree-sitter error: {0}")]
    TreeSitterError(String),

    /// File extension is not a C/C++ source or header
    #[error("Unsupported source file: {0}")]
    UnsupportedFile(String),
}

impl SyntaxError {
    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a tree-sitter error
    pub fn tree_sitter(msg: impl Into<String>) -> Self {
        Self::TreeSitterError(msg.into())
    }
}
