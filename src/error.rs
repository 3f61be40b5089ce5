use thiserror::Error;

/// Errors produced while preparing inputs or talking to the generation service.
#[derive(Debug, Error)]
pub enum MockupError {
    /// The caller did not supply a usable product image.
    ///
    /// This is the only error a batch run surfaces to its caller; everything
    /// that goes wrong for an individual scenario is absorbed into the report.
    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Gemini client error: {0}")]
    Gemini(#[from] gemini_rust::ClientError),

    /// The provider answered, but the response carried no inline image.
    ///
    /// Image models sometimes decline a prompt and reply with text only.
    #[error("No image part found in response for prompt: \"{prompt}\"")]
    NoImageInResponse { prompt: String },

    #[error("No text found in model response")]
    NoTextInResponse,

    #[error("Invalid base64 image payload: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Context error: {0}")]
    Context(String),
}

impl MockupError {
    /// Create an input error.
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input(message.into())
    }

    /// Create a missing-image error for the given prompt.
    pub fn no_image(prompt: impl Into<String>) -> Self {
        Self::NoImageInResponse {
            prompt: prompt.into(),
        }
    }

    /// Check if this error is a precondition failure on the caller's input.
    pub fn is_input(&self) -> bool {
        matches!(self, Self::Input(_))
    }

    /// Check if this error is expected to be transient for a single attempt.
    ///
    /// Batch runs retry every per-scenario failure regardless; this is exposed
    /// for callers that drive the client directly.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::NoImageInResponse { .. } | Self::NoTextInResponse | Self::Decode(_) => true,
            Self::Gemini(gemini_rust::ClientError::BadResponse { code, .. }) => {
                *code == 429 || *code >= 500
            }
            Self::Gemini(_) => true,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, MockupError>;

/// Extension trait for adding context to errors.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn with_context(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E: Into<MockupError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let base_err = e.into();
            MockupError::Context(format!("{}: {}", context.into(), base_err))
        })
    }
}
