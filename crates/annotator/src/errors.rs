use feedreply_generation::GenerationError;
use feedreply_locator::LocatorError;
use thiserror::Error;

/// Failures while building an engine. Nothing after construction fails
/// outward: scan problems are "not found" and cycle problems end up on the
/// control that hit them.
#[derive(Debug, Error)]
pub enum AnnotatorError {
    #[error("invalid locator configuration: {0}")]
    Locator(#[from] LocatorError),
    #[error("generation client: {0}")]
    Generation(#[from] GenerationError),
    #[error("annotator must be created inside a tokio runtime")]
    NoRuntime,
}
