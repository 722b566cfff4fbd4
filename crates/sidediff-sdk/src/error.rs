use sidediff_types::{ComparisonId, Side};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("nothing to compare with id {0}, it may have expired")]
    NotFound(ComparisonId),

    #[error("comparison {id} is missing its {missing} part")]
    Incomplete { id: ComparisonId, missing: Side },

    #[error("could not stage part: {0}")]
    Io(#[from] std::io::Error),

    #[error("diff error: {0}")]
    Diff(#[from] sidediff_diff::DiffError),

    #[error("store error: {0}")]
    Store(#[from] sidediff_store::StoreError),

    #[error("gave up staging {side} part of comparison {id} after {attempts} attempts")]
    Contended {
        id: ComparisonId,
        side: Side,
        attempts: usize,
    },
}

pub type SdkResult<T> = Result<T, SdkError>;
