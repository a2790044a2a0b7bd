use redis::RedisError;
use thiserror::Error;

/// Raised while opening or closing a probe connection.
///
/// An open error never fails a test: the gate turns it into a skip.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error(transparent)]
    Redis(#[from] RedisError),
    #[error("unexpected handshake reply: {reply}")]
    UnexpectedHandshake { reply: String },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ProbeError {
    pub fn other(message: &str) -> Self {
        Self::Other(anyhow::anyhow!(message.to_string()))
    }
}
