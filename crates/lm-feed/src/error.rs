use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type FeedResult<T> = Result<T, FeedError>;
