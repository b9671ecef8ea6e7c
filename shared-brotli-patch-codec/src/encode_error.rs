#[derive(Debug, Clone, PartialEq)]
pub enum EncodeError {
    InitFailure,
    InvalidDictionary,
    EncodingFailed(String),
}

impl std::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            EncodeError::InitFailure => write!(f, "Failed to initialize the brotli encoder."),
            EncodeError::InvalidDictionary => write!(f, "Shared dictionary format is invalid."),
            EncodeError::EncodingFailed(msg) => write!(f, "Brotli encoding failed: {}", msg),
        }
    }
}

impl std::error::Error for EncodeError {}
