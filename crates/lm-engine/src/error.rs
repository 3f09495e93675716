use lm_anim::AnimError;
use lm_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine configuration error: {0}")]
    Config(#[from] CoreError),

    #[error(transparent)]
    Marker(#[from] AnimError),
}

pub type EngineResult<T> = Result<T, EngineError>;
