use lm_core::EntityId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnimError {
    #[error("animation path has no valid points")]
    EmptyPath,

    #[error("no tracked marker for entity {0}")]
    UnknownMarker(EntityId),
}

pub type AnimResult<T> = Result<T, AnimError>;
