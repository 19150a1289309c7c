use crate::core::Pipeline;
use crate::domain::model::RunSummary;
use crate::utils::error::Result;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    /// Run extract, transform and load. Any error aborts the run before
    /// reports are written.
    pub async fn run(&self) -> Result<RunSummary> {
        tracing::info!("Starting naming run");

        // Extract
        let candidates = self.pipeline.extract().await?;
        let candidate_count = candidates.len();
        if candidates.is_empty() {
            tracing::warn!("All names unavailable, please check the anchor character");
            return Ok(RunSummary::default());
        }

        // Transform
        tracing::info!("Total names: {}. Start processing", candidate_count);
        let report = self.pipeline.transform(candidates).await?;

        // Load
        let outputs = self.pipeline.load(&report).await?;
        for path in &outputs {
            tracing::info!("Output saved to: {}", path);
        }

        if !report.failed.is_empty() {
            tracing::warn!("{} names failed to parse: {:?}", report.failed.len(), report.failed);
        }

        Ok(RunSummary {
            candidates: candidate_count,
            accepted: report.records.len(),
            rejected: report.rejected,
            failed: report.failed,
            outputs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BatchReport, Candidate};
    use crate::utils::error::EtlError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct StubPipeline {
        candidates: Vec<&'static str>,
        fail_transform: bool,
        loaded: AtomicBool,
    }

    impl StubPipeline {
        fn new(candidates: Vec<&'static str>) -> Self {
            Self {
                candidates,
                fail_transform: false,
                loaded: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl Pipeline for StubPipeline {
        async fn extract(&self) -> Result<Vec<Candidate>> {
            self.candidates.iter().map(|name| Candidate::new(*name)).collect()
        }

        async fn transform(&self, candidates: Vec<Candidate>) -> Result<BatchReport> {
            if self.fail_transform {
                return Err(EtlError::ProcessingError {
                    message: "scoring service unreachable".to_string(),
                });
            }
            let mut report = BatchReport::with_total(candidates.len());
            report.rejected = candidates.len() - 1;
            report.failed.push(candidates[0].to_string());
            Ok(report)
        }

        async fn load(&self, _report: &BatchReport) -> Result<Vec<String>> {
            self.loaded.store(true, Ordering::SeqCst);
            Ok(vec!["out/result_-童.json".to_string(), "out/result_-童.csv".to_string()])
        }
    }

    #[tokio::test]
    async fn test_run_summarises_report() {
        let engine = EtlEngine::new(StubPipeline::new(vec!["乐童", "禾童", "宇童"]));

        let summary = engine.run().await.unwrap();

        assert_eq!(summary.candidates, 3);
        assert_eq!(summary.accepted, 0);
        assert_eq!(summary.rejected, 2);
        assert_eq!(summary.failed, vec!["乐童".to_string()]);
        assert_eq!(summary.outputs.len(), 2);
    }

    #[tokio::test]
    async fn test_no_candidates_skips_scoring_and_output() {
        let engine = EtlEngine::new(StubPipeline::new(vec![]));

        let summary = engine.run().await.unwrap();

        assert_eq!(summary.candidates, 0);
        assert!(summary.outputs.is_empty());
        assert!(!engine.pipeline().loaded.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_fatal_transform_error_writes_nothing() {
        let mut pipeline = StubPipeline::new(vec!["乐童"]);
        pipeline.fail_transform = true;
        let engine = EtlEngine::new(pipeline);

        assert!(engine.run().await.is_err());
        assert!(!engine.pipeline().loaded.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_malformed_candidate_is_fatal() {
        let engine = EtlEngine::new(StubPipeline::new(vec!["乐"]));
        assert!(matches!(
            engine.run().await,
            Err(EtlError::InvalidCandidate { .. })
        ));
    }
}
