use crate::domain::model::{
    CandidateResponse, RatedResponse, Rating, RatingCriteria, RunSummary, SourceRow,
};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Where candidate responses live and where ratings are written back.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn fetch_criteria(&self) -> Result<RatingCriteria>;
    async fn fetch_unrated(&self) -> Result<Vec<SourceRow>>;
    async fn apply_rating(&self, page_id: &str, rating: &Rating) -> Result<()>;
    async fn mark_error(&self, page_id: &str) -> Result<()>;
}

/// Scores a single response against the criteria.
#[async_trait]
pub trait ResponseRater: Send + Sync {
    async fn rate(
        &self,
        criteria: &RatingCriteria,
        candidate: &CandidateResponse,
    ) -> Result<Rating>;
}

/// Everything pulled out of the store in one extract pass.
#[derive(Debug, Clone)]
pub struct ExtractBatch {
    pub criteria: RatingCriteria,
    pub rows: Vec<SourceRow>,
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<ExtractBatch>;
    async fn transform(&self, batch: ExtractBatch) -> Result<Vec<RatedResponse>>;
    async fn load(&self, rated: Vec<RatedResponse>) -> Result<RunSummary>;
}
