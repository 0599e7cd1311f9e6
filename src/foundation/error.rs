/// Result type used across the benchmark core.
pub type BenchResult<T> = Result<T, BenchError>;

/// Errors raised by stages, the worker pool, the controller and configuration loading.
#[derive(thiserror::Error, Debug)]
pub enum BenchError {
    /// A stage or pool could not acquire its resources or threads.
    #[error("stage setup error: {0}")]
    Setup(String),

    /// Background work is in flight; retry the operation later.
    #[error("resize refused: {0}")]
    Busy(String),

    /// An operation was called in the wrong life-cycle phase.
    #[error("lifecycle error: {0}")]
    Lifecycle(String),

    /// Invalid configuration values.
    #[error("config error: {0}")]
    Config(String),

    /// Score report encoding or server response parsing failed.
    #[error("report error: {0}")]
    Report(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BenchError {
    /// Build a [`BenchError::Setup`] value.
    pub fn setup(msg: impl Into<String>) -> Self {
        Self::Setup(msg.into())
    }

    /// Build a [`BenchError::Busy`] value.
    pub fn busy(msg: impl Into<String>) -> Self {
        Self::Busy(msg.into())
    }

    /// Build a [`BenchError::Lifecycle`] value.
    pub fn lifecycle(msg: impl Into<String>) -> Self {
        Self::Lifecycle(msg.into())
    }

    /// Build a [`BenchError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`BenchError::Report`] value.
    pub fn report(msg: impl Into<String>) -> Self {
        Self::Report(msg.into())
    }

    /// `true` for errors the caller may retry later without tearing anything down.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
