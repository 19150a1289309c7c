use crate::core::scorer::{DEFAULT_ENDPOINT, DEFAULT_SURNAME};
use crate::domain::model::{AnchorPosition, ExtractionPatterns};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "naming-etl")]
#[command(about = "Generate two-character names and keep the ones the scoring site rates highly")]
pub struct CliConfig {
    /// Character dictionary CSV
    #[arg(long, default_value = "Char.csv")]
    pub dictionary: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    /// Fixed character present in every generated name
    #[arg(long, default_value = "童")]
    pub anchor: String,

    #[arg(long, value_enum, default_value_t = AnchorPosition::Second)]
    pub anchor_position: AnchorPosition,

    #[arg(long, default_value = DEFAULT_SURNAME)]
    pub surname: String,

    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Maximum total grade (surname grade + both strokes)
    #[arg(long, default_value = "40")]
    pub total_stroke_limit: u32,

    #[arg(long, help = "Disable the total grade filter")]
    pub no_total_filter: bool,

    /// Minimum overall score to keep a name
    #[arg(long, default_value = "90")]
    pub score_threshold: f64,

    #[arg(long, help = "Keep every scored name regardless of score")]
    pub no_score_filter: bool,

    #[arg(long, default_value = "100")]
    pub concurrent_requests: usize,

    /// Per-request timeout in seconds; unset waits for the service
    #[arg(long)]
    pub request_timeout_secs: Option<u64>,

    #[arg(long, help = "Generate candidates only, without scoring or writing files")]
    pub dry_run: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

impl ConfigProvider for CliConfig {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn surname(&self) -> &str {
        &self.surname
    }

    fn anchor(&self) -> &str {
        &self.anchor
    }

    fn anchor_position(&self) -> AnchorPosition {
        self.anchor_position
    }

    fn dictionary_path(&self) -> &str {
        &self.dictionary
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn total_stroke_limit(&self) -> Option<u32> {
        (!self.no_total_filter).then_some(self.total_stroke_limit)
    }

    fn score_threshold(&self) -> Option<f64> {
        (!self.no_score_filter).then_some(self.score_threshold)
    }

    fn concurrent_requests(&self) -> usize {
        self.concurrent_requests
    }

    fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    fn extraction_patterns(&self) -> ExtractionPatterns {
        ExtractionPatterns::default()
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("endpoint", &self.endpoint)?;
        validation::validate_path("dictionary", &self.dictionary)?;
        validation::validate_file_extensions("dictionary", std::slice::from_ref(&self.dictionary), &["csv"])?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_single_char("anchor", &self.anchor)?;
        validation::validate_non_empty_string("surname", &self.surname)?;
        validation::validate_positive_number("concurrent_requests", self.concurrent_requests, 1)?;
        if let Some(timeout) = self.request_timeout_secs {
            validation::validate_positive_number("request_timeout_secs", timeout as usize, 1)?;
        }
        if !self.no_score_filter {
            validation::validate_range("score_threshold", self.score_threshold, 0.0, 100.0)?;
        }
        Ok(())
    }
}
