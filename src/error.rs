pub type CantomimeResult<T> = Result<T, CantomimeError>;

#[derive(thiserror::Error, Debug)]
pub enum CantomimeError {
    #[error("validation error: {0}")]
    Validation(String),

    /// Fatal precondition class: the per-frame entry point was invoked on a
    /// session whose lifecycle preconditions do not hold.
    #[error("session error: {0}")]
    Session(String),

    #[error("timeline error: {0}")]
    Timeline(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CantomimeError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session(msg.into())
    }

    pub fn timeline(msg: impl Into<String>) -> Self {
        Self::Timeline(msg.into())
    }
}
