use std::fmt;
use std::path::Path;

/// Failure raised by the surfaces around the task list: seed files,
/// configuration and command input. List operations themselves never fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    InvalidInput(String),
    InvalidData(String),
    Io(String),
}

impl AppError {
    pub fn invalid_input<M: Into<String>>(message: M) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn invalid_data<M: Into<String>>(message: M) -> Self {
        Self::InvalidData(message.into())
    }

    pub fn io<M: Into<String>>(message: M) -> Self {
        Self::Io(message.into())
    }

    /// `Io` error for a file that could not be read, e.g. a missing seed.
    pub fn io_at(path: &Path, err: impl fmt::Display) -> Self {
        Self::Io(format!("{}: {err}", path.display()))
    }

    pub fn invalid_data_at(path: &Path, err: impl fmt::Display) -> Self {
        Self::InvalidData(format!("{}: {err}", path.display()))
    }

    /// Same kind, with the message prefixed by the file it came from.
    pub fn at_path(self, path: &Path) -> Self {
        let located = format!("{}: {}", path.display(), self.message());
        match self {
            Self::InvalidInput(_) => Self::InvalidInput(located),
            Self::InvalidData(_) => Self::InvalidData(located),
            Self::Io(_) => Self::Io(located),
        }
    }

    /// Stable machine-readable code, printed ahead of the message by the CLI.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::InvalidData(_) => "invalid_data",
            Self::Io(_) => "io_error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::InvalidInput(message) | Self::InvalidData(message) | Self::Io(message) => {
                message
            }
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.code(), self.message())
    }
}

impl std::error::Error for AppError {}
