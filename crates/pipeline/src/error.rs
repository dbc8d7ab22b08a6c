use crate::store::StoreError;

/// A fault that abandoned an aggregation run.
///
/// Teams upserted before the fault stay committed; the next run repairs
/// the rest.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Aggregation failed: {0}")]
    Store(#[from] StoreError),
}
