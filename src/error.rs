//! Process-level error: a message plus the exit code `main` returns.

/// Configuration, terminal and local file problems.
pub const EXIT_CONFIG: u8 = 2;
/// Backend failures surfaced by one-shot subcommands.
pub const EXIT_BACKEND: u8 = 4;

#[derive(Debug, Clone)]
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

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(EXIT_CONFIG, message)
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::new(EXIT_BACKEND, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for AppError {}
