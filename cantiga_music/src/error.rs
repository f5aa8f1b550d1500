// Error types for the analysis pipeline and the player boundary.
//
// `AnalysisError` is raised by individual stages and never escapes the
// orchestrator: it is caught at the stage boundary, logged, and replaced by
// the character-mapping fallback. `PlayerError` is the only error a caller
// of this crate sees, and only when writing output.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("invalid pitch name '{0}'")]
    InvalidPitch(String),

    #[error("unknown chord degree '{degree}' in key {key}")]
    UnknownDegree { degree: String, key: String },

    #[error("stage {stage} produced no events for non-empty input")]
    EmptyStageOutput { stage: &'static str },

    #[error("stage {stage} lost alignment with the input text")]
    Misaligned { stage: &'static str },
}

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("MIDI encoding failed: {0}")]
    Midi(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let e = AnalysisError::InvalidPitch("H9".to_string());
        assert_eq!(e.to_string(), "invalid pitch name 'H9'");

        let e = AnalysisError::UnknownDegree {
            degree: "VIII".to_string(),
            key: "C".to_string(),
        };
        assert!(e.to_string().contains("VIII"), "degree missing: {e}");
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let e: PlayerError = io.into();
        assert!(matches!(e, PlayerError::Io(_)));
    }
}
