//! Error types for the analyzer.

use thiserror::Error;

use crate::model::PlaybackError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AnalyzerError {
    /// A configuration value is out of range.
    #[error("invalid config `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    /// Configuration JSON could not be parsed.
    #[error("config json parse error: {0}")]
    ConfigParse(String),

    /// Rig definition JSON could not be parsed.
    #[error("rig json parse error: {0}")]
    ModelParse(String),

    /// The pose model failed while sampling an animation. Pose state was restored.
    #[error("playback failed while sampling '{animation}': {source}")]
    Playback {
        animation: String,
        #[source]
        source: PlaybackError,
    },

    /// The pose model failed while restoring its track state.
    #[error("failed to restore pose after sampling '{animation}': {source}")]
    Restore {
        animation: String,
        #[source]
        source: PlaybackError,
    },
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;
