use crate::domain::model::{RatedResponse, RatingOutcome, RunSummary, SourceRow};
use crate::domain::ports::{ExtractBatch, Pipeline, ResponseRater, ReviewStore};
use crate::utils::error::Result;
use async_trait::async_trait;

/// The rating batch job: pull criteria and unrated responses out of the
/// store, score each response with the rater, write the results back.
/// One bad response never aborts the batch; it is marked 'Error' in the
/// store and the run moves on.
pub struct RatingPipeline<S: ReviewStore, R: ResponseRater> {
    store: S,
    rater: R,
}

impl<S: ReviewStore, R: ResponseRater> RatingPipeline<S, R> {
    pub fn new(store: S, rater: R) -> Self {
        Self { store, rater }
    }
}

#[async_trait]
impl<S: ReviewStore, R: ResponseRater> Pipeline for RatingPipeline<S, R> {
    async fn extract(&self) -> Result<ExtractBatch> {
        // 評分標準拿不到就整批中止，沒有標準的評分沒有意義
        let criteria = self.store.fetch_criteria().await?;
        let rows = self.store.fetch_unrated().await?;

        Ok(ExtractBatch { criteria, rows })
    }

    async fn transform(&self, batch: ExtractBatch) -> Result<Vec<RatedResponse>> {
        let mut rated = Vec::with_capacity(batch.rows.len());

        for row in batch.rows {
            match row {
                SourceRow::Complete(candidate) => {
                    tracing::info!("🤖 Processing page: {}", candidate.page_id);

                    let outcome = match self.rater.rate(&batch.criteria, &candidate).await {
                        Ok(rating) => RatingOutcome::Rated(rating),
                        Err(e) => {
                            tracing::warn!(
                                "⚠️ Rating failed for page {}: {}",
                                candidate.page_id,
                                e
                            );
                            RatingOutcome::Failed {
                                reason: e.to_string(),
                            }
                        }
                    };

                    rated.push(RatedResponse {
                        page_id: candidate.page_id,
                        outcome,
                    });
                }
                SourceRow::Malformed { page_id, reason } => {
                    tracing::warn!(
                        "⚠️ Page {} has missing or malformed properties: {}",
                        page_id,
                        reason
                    );
                    rated.push(RatedResponse {
                        page_id,
                        outcome: RatingOutcome::Failed { reason },
                    });
                }
            }
        }

        Ok(rated)
    }

    async fn load(&self, rated: Vec<RatedResponse>) -> Result<RunSummary> {
        let mut summary = RunSummary {
            fetched: rated.len(),
            ..RunSummary::default()
        };

        for response in rated {
            match response.outcome {
                RatingOutcome::Rated(rating) => {
                    match self.store.apply_rating(&response.page_id, &rating).await {
                        Ok(()) => summary.rated += 1,
                        Err(e) => {
                            tracing::warn!(
                                "⚠️ Failed to write rating for page {}: {}",
                                response.page_id,
                                e
                            );
                            self.flag_error(&response.page_id).await;
                            summary.failed += 1;
                        }
                    }
                }
                RatingOutcome::Failed { reason } => {
                    tracing::warn!(
                        "⚠️ Skipping update for page {} due to rating failure: {}",
                        response.page_id,
                        reason
                    );
                    self.flag_error(&response.page_id).await;
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }
}

impl<S: ReviewStore, R: ResponseRater> RatingPipeline<S, R> {
    // 標記失敗本身失敗時只能記錄，不讓它拖垮整批
    async fn flag_error(&self, page_id: &str) {
        if let Err(e) = self.store.mark_error(page_id).await {
            tracing::error!("❌ Could not mark page {} as 'Error': {}", page_id, e);
        }
    }
}
