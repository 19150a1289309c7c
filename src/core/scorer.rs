use crate::core::extraction::{ExtractionFailure, ExtractionRules};
use crate::domain::model::{Candidate, ScoreRecord};
use crate::domain::ports::Scorer;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://www.xingming.com/dafen/";
pub const DEFAULT_SURNAME: &str = "杨";

/// Posts candidates to the scoring page and extracts the result.
pub struct RemoteScorer {
    client: Client,
    endpoint: String,
    surname: String,
    rules: ExtractionRules,
}

impl RemoteScorer {
    pub fn new(endpoint: impl Into<String>, surname: impl Into<String>, rules: ExtractionRules) -> Self {
        Self::with_client(Client::new(), endpoint, surname, rules)
    }

    /// `None` leaves requests without a deadline.
    pub fn with_timeout(
        endpoint: impl Into<String>,
        surname: impl Into<String>,
        rules: ExtractionRules,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_client(builder.build()?, endpoint, surname, rules))
    }

    pub fn with_client(
        client: Client,
        endpoint: impl Into<String>,
        surname: impl Into<String>,
        rules: ExtractionRules,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            surname: surname.into(),
            rules,
        }
    }
}

#[async_trait]
impl Scorer for RemoteScorer {
    async fn score(&self, candidate: &Candidate) -> Result<Option<ScoreRecord>> {
        let form = [
            ("xs", self.surname.as_str()),
            ("mz", candidate.as_str()),
            ("action", "test"),
        ];

        // 網路錯誤直接往上拋，整批中止
        let response = self.client.post(&self.endpoint).form(&form).send().await?;
        tracing::debug!("Scoring '{}' returned status {}", candidate, response.status());
        let body = response.text().await?;

        match self.rules.extract(candidate.as_str(), &body) {
            Ok(record) => {
                tracing::debug!("Scored '{}': {}", candidate, record.score);
                Ok(Some(record))
            }
            Err(ExtractionFailure::GradeCount(found)) => {
                tracing::warn!("Name '{}': expected 5 grade markers, page returned {}", candidate, found);
                Ok(None)
            }
            Err(ExtractionFailure::MissingScore) => {
                tracing::warn!("Name '{}': no overall score on the page", candidate);
                Ok(None)
            }
        }
    }
}
