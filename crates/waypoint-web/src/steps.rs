#![forbid(unsafe_code)]

//! Step lists handed over from JavaScript as JSON.

use waypoint_tour::Step;

/// Errors from decoding a step list.
#[derive(Debug)]
pub enum StepsError {
    /// Not a JSON array of steps.
    Json(serde_json::Error),
    /// A step with an empty `targetId`.
    EmptyTargetId { index: usize },
}

impl std::fmt::Display for StepsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(e) => write!(f, "invalid steps JSON: {e}"),
            Self::EmptyTargetId { index } => write!(f, "step {index} has an empty targetId"),
        }
    }
}

impl std::error::Error for StepsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            Self::EmptyTargetId { .. } => None,
        }
    }
}

impl From<serde_json::Error> for StepsError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// Decode `[{ "targetId", "title", "content", "position"? }, ...]`.
///
/// An empty array is accepted; the tour then renders nothing.
pub fn parse_steps(json: &str) -> Result<Vec<Step>, StepsError> {
    let steps: Vec<Step> = serde_json::from_str(json)?;
    if let Some(index) = steps.iter().position(|s| s.target_id.is_empty()) {
        return Err(StepsError::EmptyTargetId { index });
    }
    tracing::debug!(count = steps.len(), "steps decoded");
    Ok(steps)
}
