use thiserror::Error;

/// Crate-wide error type.
///
/// Transport errors are recorded by the request tracker and then propagated;
/// assertion errors are contained at the collector boundary and turned into
/// FAIL outcomes.
#[derive(Debug, Error)]
pub enum Error {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid header `{name}`: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("task panicked: {0}")]
    TaskPanicked(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("assertion failed: {0}")]
    Assertion(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Assertion helper for test bodies: a failed check becomes an
/// [`Error::Assertion`], which the collector records as a FAIL outcome
/// instead of aborting the run.
pub fn ensure(condition: bool, message: impl Into<String>) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(Error::Assertion(message.into()))
    }
}
