use crate::domain::model::RunSummary;
use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct RatingEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> RatingEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(false),
        }
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        let started_at = chrono::Utc::now();
        tracing::info!("🚀 Starting rating run at {}", started_at.to_rfc3339());

        // Extract
        let batch = self.pipeline.extract().await?;
        self.monitor.log_stats("Extract");

        if batch.rows.is_empty() {
            tracing::info!("✅ No new responses to rate. Exiting.");
            return Ok(RunSummary::default());
        }
        tracing::info!("📥 Extracted {} responses", batch.rows.len());

        // Transform
        let rated = self.pipeline.transform(batch).await?;
        self.monitor.log_stats("Transform");

        // Load
        let summary = self.pipeline.load(rated).await?;
        self.monitor.log_stats("Load");

        let elapsed = chrono::Utc::now() - started_at;
        tracing::info!(
            "🏁 Run finished in {}s: {} fetched, {} rated, {} failed",
            elapsed.num_seconds(),
            summary.fetched,
            summary.rated,
            summary.failed
        );
        self.monitor.log_final_stats();

        Ok(summary)
    }
}
