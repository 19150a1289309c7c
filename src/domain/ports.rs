use crate::domain::model::{
    AnchorPosition, BatchReport, Candidate, ExtractionPatterns, ScoreRecord,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn rename_file(&self, from: &str, to: &str) -> impl std::future::Future<Output = Result<()>> + Send;
    fn remove_file(&self, path: &str) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn endpoint(&self) -> &str;
    fn surname(&self) -> &str;
    fn anchor(&self) -> &str;
    fn anchor_position(&self) -> AnchorPosition;
    fn dictionary_path(&self) -> &str;
    fn output_path(&self) -> &str;
    /// `None` disables the total-grade filter.
    fn total_stroke_limit(&self) -> Option<u32>;
    /// `None` disables score filtering.
    fn score_threshold(&self) -> Option<f64>;
    fn concurrent_requests(&self) -> usize;
    /// `None` waits as long as the service takes.
    fn request_timeout(&self) -> Option<Duration>;
    fn extraction_patterns(&self) -> ExtractionPatterns;
}

/// Scores a single candidate.
///
/// `Ok(None)` is a soft failure: the page did not have the expected shape.
/// `Err` is fatal for the whole run.
#[async_trait]
pub trait Scorer: Send + Sync {
    async fn score(&self, candidate: &Candidate) -> Result<Option<ScoreRecord>>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<Candidate>>;
    async fn transform(&self, candidates: Vec<Candidate>) -> Result<BatchReport>;
    async fn load(&self, report: &BatchReport) -> Result<Vec<String>>;
}
