//! Error types for tone playback

use thiserror::Error;

/// Errors that can occur between host init and stream close
#[derive(Error, Debug)]
pub enum ToneError {
    /// Failed to bring up the host audio subsystem
    #[error("Failed to initialize audio host: {0}")]
    HostInit(String),

    /// Requested device name has no exact match in the catalog
    #[error("Audio device not found: {0}")]
    DeviceNotFound(String),

    /// Requested output channel index exceeds the device capacity
    #[error("Channel {index} out of range for {device} ({max} output channels)")]
    ChannelOutOfRange {
        index: usize,
        max: u16,
        device: String,
    },

    /// Failed to open the output stream
    #[error("Failed to open audio stream: {0}")]
    StreamOpen(String),

    /// Failed to start the output stream
    #[error("Failed to start audio stream: {0}")]
    StreamStart(String),

    /// Failed to stop the output stream
    #[error("Failed to stop audio stream: {0}")]
    StreamStop(String),

    /// Failed to release the output stream
    #[error("Failed to close audio stream: {0}")]
    StreamClose(String),
}

impl ToneError {
    /// Process exit status for this failure. The host API exposes no
    /// numeric error codes, so each failure class gets a stable one.
    pub fn exit_code(&self) -> i32 {
        match self {
            ToneError::HostInit(_) => 1,
            ToneError::DeviceNotFound(_) => -1,
            ToneError::ChannelOutOfRange { .. } => 2,
            ToneError::StreamOpen(_) => 3,
            ToneError::StreamStart(_) => 4,
            ToneError::StreamStop(_) => 5,
            ToneError::StreamClose(_) => 6,
        }
    }
}

/// Result type for tone playback operations
pub type ToneResult<T> = Result<T, ToneError>;
