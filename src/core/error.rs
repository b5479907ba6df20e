use thiserror::Error;

/// Errors raised by the queueing simulation engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// A caller-supplied parameter violates its constraint. Raised before any event is scheduled.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// An engine invariant was violated at runtime. Indicates a defect, never a caller error.
    #[error("internal consistency fault: {0}")]
    InternalConsistencyFault(String),

    /// The replication thread pool could not be created
    #[error("failed to build replication thread pool: {0}")]
    ThreadPool(String),
}

impl SimulationError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        SimulationError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    pub(crate) fn fault(message: impl Into<String>) -> Self {
        SimulationError::InternalConsistencyFault(message.into())
    }

    /// Whether this error was caused by the caller's input
    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self, SimulationError::InvalidParameter { .. })
    }
}

pub type SimulationResult<T> = Result<T, SimulationError>;
