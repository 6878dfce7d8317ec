#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GpuError {
    #[error("Out of device memory: requested {requested} bytes, {available} available")]
    OutOfMemory { requested: usize, available: usize },
    #[error("Device lost")]
    DeviceLost,
    #[error("Submission references an unknown or released resource: {0}")]
    InvalidHandle(String),
    #[error("Write of {len} bytes at offset {offset} exceeds buffer size {size}")]
    OutOfBounds {
        offset: usize,
        len: usize,
        size: usize,
    },
    #[error("Command list `{0}` is closed")]
    CommandListClosed(String),
    #[error("Command list `{0}` was submitted while still recording")]
    CommandListOpen(String),
    #[error("GPU timeline is not running")]
    QueueShutdown,
}

impl GpuError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, GpuError::DeviceLost | GpuError::QueueShutdown)
    }
}

/// Raised by the frame synchronizer.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("Device lost while waiting for completion value {0}")]
    DeviceLost(u64),
    #[error("Completion value {requested} was never signaled (last signaled: {last_signaled})")]
    NeverSignaled { requested: u64, last_signaled: u64 },
}

pub type GpuResult<T> = Result<T, GpuError>;
