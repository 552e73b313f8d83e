pub mod engine;
pub mod pipeline;

pub use crate::domain::model::{RatedResponse, Rating, RatingCriteria, RunSummary, SourceRow};
pub use crate::domain::ports::{ExtractBatch, Pipeline, ResponseRater, ReviewStore};
pub use crate::utils::error::Result;
