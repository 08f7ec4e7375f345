use thiserror::Error;

pub type Result<T> = std::result::Result<T, OracleError>;

#[derive(Error, Debug)]
pub enum OracleError {
    /// Connection, DNS or timeout failure before a response arrived
    #[error("Transport error: {0}")]
    Transport(String),

    /// Non-success HTTP status
    #[error("Oracle API error (status {status}): {body}")]
    Status { status: u16, body: String },

    /// Response arrived but could not be understood
    #[error("Failed to decode oracle response: {0}")]
    Decode(String),

    /// Backend is not usable as configured
    #[error("Oracle configuration error: {0}")]
    Config(String),

    /// Every retry attempt failed
    #[error("Oracle failed after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        last: Box<OracleError>,
    },
}

impl OracleError {
    /// Failures worth retrying: transport problems, throttling, timeouts
    /// and server-side errors.
    pub fn is_transient(&self) -> bool {
        match self {
            OracleError::Transport(_) => true,
            OracleError::Status { status, .. } => {
                matches!(status, 408 | 409 | 429) || (500..=599).contains(status)
            }
            OracleError::Decode(_) | OracleError::Config(_) | OracleError::Exhausted { .. } => {
                false
            }
        }
    }
}
