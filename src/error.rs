//! Application-level error carrying a process exit code.
//!
//! Pipeline stages never fail outward (fetch degrades to fallback data and
//! undefined statistics are values), so this type only covers the shell:
//! argument validation, terminal setup, and export I/O.

/// Invalid user input (bad dates, bad paths).
pub const EXIT_USAGE: u8 = 2;
/// Output could not be written.
pub const EXIT_IO: u8 = 3;
/// Terminal/UI failure.
pub const EXIT_UI: u8 = 4;

#[derive(Clone)]
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

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(EXIT_IO, message)
    }

    pub fn ui(message: impl Into<String>) -> Self {
        Self::new(EXIT_UI, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
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
