//! Fatal application errors.
//!
//! Every fatal condition carries the process exit code it should map to:
//!
//! - `2`: invalid configuration, unreadable input, unknown search strategy
//! - `3`: no model found (empty candidate set, or every candidate rejected)
//! - `4`: unexpected fit failure

/// Exit code for configuration and input errors.
pub const EXIT_INVALID_INPUT: u8 = 2;
/// Exit code when the search produced no usable model.
pub const EXIT_NO_MODEL: u8 = 3;
/// Exit code for fit failures other than non-finite design matrices.
pub const EXIT_FIT_FAILURE: u8 = 4;

#[derive(Clone, PartialEq, Eq)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(EXIT_INVALID_INPUT, message)
    }

    pub fn no_model(message: impl Into<String>) -> Self {
        Self::new(EXIT_NO_MODEL, message)
    }

    pub fn fit_failure(message: impl Into<String>) -> Self {
        Self::new(EXIT_FIT_FAILURE, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
