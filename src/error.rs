use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by configuration, asset loading, and state checks
#[derive(Debug, Error)]
pub enum GameError {
    /// A sound or image could not be loaded; callers degrade and keep running
    #[error("asset unavailable: {}: {reason}", path.display())]
    AssetUnavailable { path: PathBuf, reason: String },

    /// A tuning value is out of range; fatal at startup
    #[error("invalid configuration: {field}: {reason}")]
    InvalidConfiguration { field: &'static str, reason: String },

    /// Simulation state broke an invariant (should be unreachable)
    #[error("state violation: {0}")]
    StateViolation(String),

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

impl GameError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = GameError::invalid("spawn.interval", "must be > 0");
        assert_eq!(
            err.to_string(),
            "invalid configuration: spawn.interval: must be > 0"
        );

        let err = GameError::AssetUnavailable {
            path: PathBuf::from("audio/pickup_particle.wav"),
            reason: "not found".into(),
        };
        assert_eq!(
            err.to_string(),
            "asset unavailable: audio/pickup_particle.wav: not found"
        );
    }
}
