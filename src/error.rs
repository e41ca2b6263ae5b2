use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The server sent a view that is not an odd-sized square. A correct
    /// server never does this; surfaced instead of silently ignored.
    #[error("malformed view: {0}")]
    InvalidView(String),

    /// The decision layer produced a direction that cannot be sent. The
    /// controller logs this and abstains for the turn.
    #[error("invalid move: {0}")]
    InvalidMove(String),

    /// The server answered with an error body.
    #[error("server error: {0}")]
    Server(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
