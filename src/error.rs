//! Error types for CueSonic

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CueSonicError {
    /// Device enumeration, selection, or stream creation failed.
    #[error("Audio device error: {0}")]
    Device(String),

    /// A clip file was missing, unreadable, or corrupt.
    #[error("Audio decode error: {0}")]
    Decode(String),

    /// The voice pool could not construct a new voice.
    #[error("Voice creation error: {0}")]
    VoiceCreation(String),

    /// Submitting or starting a buffer on an otherwise-valid voice failed.
    #[error("Buffer submission error: {0}")]
    Submission(String),

    /// The engine was used in a state that cannot serve the call.
    #[error("Engine error: {0}")]
    Engine(String),
}

pub type Result<T> = std::result::Result<T, CueSonicError>;
