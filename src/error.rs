/// Broad failure classes used across the pipeline.
///
/// Every error that reaches the binary boundary maps to one of these kinds,
/// and each kind has a stable process exit code so scripted callers can
/// distinguish "fix your CSV" from "tool bug".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Required CSV columns are absent (`date` / `aqi`).
    MissingColumns,
    /// Bad flags, unreadable paths, malformed option values.
    InvalidInput,
    /// The cleaned series is too small or degenerate to fit.
    ForecastFit,
    /// Decomposition requested before any successful forecast.
    NoModelAvailable,
    /// Non-finite math, solver failure, terminal I/O breakage.
    Internal,
}

impl ErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::MissingColumns | ErrorKind::InvalidInput => 2,
            ErrorKind::ForecastFit => 3,
            ErrorKind::NoModelAvailable => 4,
            ErrorKind::Internal => 5,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
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
            .field("kind", &self.kind)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_stable_exit_codes() {
        assert_eq!(ErrorKind::MissingColumns.exit_code(), 2);
        assert_eq!(ErrorKind::ForecastFit.exit_code(), 3);
        assert_eq!(ErrorKind::NoModelAvailable.exit_code(), 4);
        assert_eq!(ErrorKind::Internal.exit_code(), 5);
    }

    #[test]
    fn display_shows_message_only() {
        let err = AppError::new(ErrorKind::MissingColumns, "Missing required column: `aqi`");
        assert_eq!(err.to_string(), "Missing required column: `aqi`");
        assert_eq!(err.kind(), ErrorKind::MissingColumns);
    }
}
