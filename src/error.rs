use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecognitionError {
    #[error("Could not decode image: {0}")]
    DecodeError(String),

    #[error("Classifier returned {actual} labels, expected {expected}")]
    ClassifierContractError { expected: usize, actual: usize },

    #[error("Expected {expected} piece labels, got {actual}")]
    InvalidLabelCount { expected: usize, actual: usize },

    #[error("Piece classifier failed: {0}")]
    ClassifierFailed(String),

    #[error("Invalid side to move: {0:?} (expected \"w\" or \"b\")")]
    InvalidSideToMove(String),

    #[error("Failed to write debug output: {0}")]
    DebugOutput(String),
}

impl RecognitionError {
    /// True when the caller supplied bad input, as opposed to an internal fault
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            RecognitionError::DecodeError(_) | RecognitionError::InvalidSideToMove(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, RecognitionError>;
