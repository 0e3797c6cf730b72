// src/error.rs
//
// Error taxonomy shared by the extraction, scoring and calibration stages.

use thiserror::Error;

/// Coarse category of a [`DetectionError`], used by callers to decide how
/// to report it (client input rejection vs. server fault vs. fatal setup).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The submitted audio cannot be analyzed
    ClientInput,
    /// Inference failed for a valid input
    Server,
    /// The detector is misconfigured and cannot serve any request
    Configuration,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ClientInput => "client_input",
            ErrorKind::Server => "server",
            ErrorKind::Configuration => "configuration",
        }
    }
}

#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("unsupported audio: {0}")]
    UnsupportedAudio(String),

    #[error("audio is empty")]
    EmptyAudio,

    #[error("audio too short ({duration_secs:.2}s), minimum {min_secs:.1}s required")]
    AudioTooShort { duration_secs: f64, min_secs: f64 },

    #[error("feature extraction failed: {0}")]
    FeatureExtractionFailed(String),

    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("prediction failed: {0}")]
    PredictionFailed(String),

    #[error("feature schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl DetectionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DetectionError::UnsupportedAudio(_)
            | DetectionError::EmptyAudio
            | DetectionError::AudioTooShort { .. }
            | DetectionError::FeatureExtractionFailed(_) => ErrorKind::ClientInput,
            DetectionError::PredictionFailed(_) => ErrorKind::Server,
            DetectionError::ModelUnavailable(_)
            | DetectionError::SchemaMismatch(_)
            | DetectionError::InvalidConfig(_) => ErrorKind::Configuration,
        }
    }

    /// True if the request should be rejected as bad input
    pub fn is_client_error(&self) -> bool {
        self.kind() == ErrorKind::ClientInput
    }
}

pub type Result<T> = std::result::Result<T, DetectionError>;
