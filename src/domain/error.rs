//! Domain error types.

/// Top-level error type for reversion.
///
/// Every indicator, simulation and data-source call fails with one of these
/// variants; callers treat any error as fatal to that single computation.
#[derive(Debug, thiserror::Error)]
pub enum ReversionError {
    #[error("insufficient data: need at least {needed} data points, have {available}")]
    InsufficientData { needed: usize, available: usize },

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("unknown token: {token}")]
    InvalidToken { token: String },

    #[error("rate limited by {provider}")]
    RateLimited { provider: String },

    #[error("network error: {reason}")]
    Network { reason: String },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ReversionError {
    pub fn invalid(name: &str, reason: impl Into<String>) -> Self {
        ReversionError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub fn insufficient(needed: usize, available: usize) -> Self {
        ReversionError::InsufficientData { needed, available }
    }
}

impl From<&ReversionError> for std::process::ExitCode {
    fn from(err: &ReversionError) -> Self {
        let code: u8 = match err {
            ReversionError::Io(_) => 1,
            ReversionError::ConfigParse { .. }
            | ReversionError::ConfigMissing { .. }
            | ReversionError::ConfigInvalid { .. } => 2,
            ReversionError::InvalidToken { .. }
            | ReversionError::RateLimited { .. }
            | ReversionError::Network { .. }
            | ReversionError::Data { .. } => 3,
            ReversionError::InvalidParameter { .. } => 4,
            ReversionError::InsufficientData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
