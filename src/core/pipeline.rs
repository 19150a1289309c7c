use crate::core::coordinator::Coordinator;
use crate::core::dictionary::parse_dictionary;
use crate::core::extraction::ExtractionRules;
use crate::core::generator::{generate_candidates, GeneratorRules};
use crate::core::report::{report_stem, write_reports};
use crate::core::scorer::RemoteScorer;
use crate::core::{BatchReport, Candidate, ConfigProvider, Pipeline, Scorer, Storage};
use crate::domain::model::CharacterEntry;
use crate::utils::error::Result;
use std::sync::Arc;

/// Dictionary in, scored names out.
///
/// extract: load the dictionary and generate candidates.
/// transform: score candidates through the worker pool.
/// load: write the JSON and CSV reports.
pub struct NamingPipeline<S: Storage, C: ConfigProvider, R: Scorer + 'static> {
    storage: S,
    config: C,
    scorer: Arc<R>,
}

impl<S: Storage, C: ConfigProvider> NamingPipeline<S, C, RemoteScorer> {
    pub fn new(storage: S, config: C) -> Result<Self> {
        let rules = ExtractionRules::compile(&config.extraction_patterns())?;
        let scorer = RemoteScorer::with_timeout(
            config.endpoint(),
            config.surname(),
            rules,
            config.request_timeout(),
        )?;
        Ok(Self::with_scorer(storage, config, scorer))
    }
}

impl<S: Storage, C: ConfigProvider, R: Scorer + 'static> NamingPipeline<S, C, R> {
    pub fn with_scorer(storage: S, config: C, scorer: R) -> Self {
        Self {
            storage,
            config,
            scorer: Arc::new(scorer),
        }
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    pub async fn load_dictionary(&self) -> Result<Vec<CharacterEntry>> {
        let path = self.config.dictionary_path();
        tracing::debug!("Reading dictionary from {}", path);
        let data = self.storage.read_file(path).await?;
        parse_dictionary(&data)
    }

    fn generator_rules(&self) -> GeneratorRules {
        GeneratorRules::new(self.config.anchor(), self.config.anchor_position())
            .with_total_stroke_limit(self.config.total_stroke_limit())
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, R: Scorer + 'static> Pipeline for NamingPipeline<S, C, R> {
    async fn extract(&self) -> Result<Vec<Candidate>> {
        let entries = self.load_dictionary().await?;
        tracing::info!("Loaded {} dictionary entries", entries.len());

        let candidates = generate_candidates(&entries, &self.generator_rules())?;
        tracing::info!("All names generated, count: {}", candidates.len());
        Ok(candidates)
    }

    async fn transform(&self, candidates: Vec<Candidate>) -> Result<BatchReport> {
        Coordinator::new(Arc::clone(&self.scorer), self.config.concurrent_requests())
            .with_threshold(self.config.score_threshold())
            .run(candidates)
            .await
    }

    async fn load(&self, report: &BatchReport) -> Result<Vec<String>> {
        let stem = report_stem(self.config.anchor(), self.config.anchor_position());
        write_reports(&self.storage, self.config.output_path(), &stem, &report.records).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::extraction::tests::sample_page;
    use crate::domain::model::{AnchorPosition, ExtractionPatterns, ScoreRecord};
    use crate::utils::error::EtlError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::time::Duration;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn put_file(&self, path: &str, data: &[u8]) {
            self.files.lock().await.insert(path.to_string(), data.to_vec());
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                EtlError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }

        async fn rename_file(&self, from: &str, to: &str) -> Result<()> {
            let mut files = self.files.lock().await;
            let data = files.remove(from).ok_or_else(|| {
                EtlError::IoError(std::io::Error::new(std::io::ErrorKind::NotFound, from.to_string()))
            })?;
            files.insert(to.to_string(), data);
            Ok(())
        }

        async fn remove_file(&self, path: &str) -> Result<()> {
            self.files.lock().await.remove(path);
            Ok(())
        }
    }

    struct MockConfig {
        anchor: String,
        position: AnchorPosition,
        threshold: Option<f64>,
        total_limit: Option<u32>,
    }

    impl MockConfig {
        fn new() -> Self {
            Self {
                anchor: "童".to_string(),
                position: AnchorPosition::Second,
                threshold: Some(90.0),
                total_limit: Some(40),
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn endpoint(&self) -> &str {
            "http://127.0.0.1:1/dafen/"
        }

        fn surname(&self) -> &str {
            "杨"
        }

        fn anchor(&self) -> &str {
            &self.anchor
        }

        fn anchor_position(&self) -> AnchorPosition {
            self.position
        }

        fn dictionary_path(&self) -> &str {
            "Char.csv"
        }

        fn output_path(&self) -> &str {
            "test_output"
        }

        fn total_stroke_limit(&self) -> Option<u32> {
            self.total_limit
        }

        fn score_threshold(&self) -> Option<f64> {
            self.threshold
        }

        fn concurrent_requests(&self) -> usize {
            4
        }

        fn request_timeout(&self) -> Option<Duration> {
            Some(Duration::from_secs(5))
        }

        fn extraction_patterns(&self) -> ExtractionPatterns {
            ExtractionPatterns::default()
        }
    }

    /// Scores come from a fixed table; names not in it fail to parse.
    struct TableScorer {
        scores: HashMap<&'static str, &'static str>,
        rules: ExtractionRules,
    }

    impl TableScorer {
        fn new(scores: &[(&'static str, &'static str)]) -> Self {
            Self {
                scores: scores.iter().copied().collect(),
                rules: ExtractionRules::compile(&ExtractionPatterns::default()).unwrap(),
            }
        }
    }

    #[async_trait]
    impl Scorer for TableScorer {
        async fn score(&self, candidate: &Candidate) -> Result<Option<ScoreRecord>> {
            let body = match self.scores.get(candidate.as_str()) {
                Some(score) => sample_page(score),
                None => "<html></html>".to_string(),
            };
            Ok(self.rules.extract(candidate.as_str(), &body).ok())
        }
    }

    const DICTIONARY: &str = "\
id,simplified,traditional,pinyin,radical,structure,meaning,jixiong,wuxing,kangxi,bihua
1,乐,樂,le,,,,吉,木,,15
2,童,童,tong,,,,吉,金,,12
3,禾,禾,he,,,,吉,木,,5
4,泉,泉,quan,,,,吉,水,,9
5,安,安,an,,,,凶,土,,6
6,宇,宇,yu,,,,平,土,,6
";

    async fn pipeline(config: MockConfig, scores: &[(&'static str, &'static str)]) -> (NamingPipeline<MockStorage, MockConfig, TableScorer>, MockStorage) {
        let storage = MockStorage::new();
        storage.put_file("Char.csv", DICTIONARY.as_bytes()).await;
        let pipeline = NamingPipeline::with_scorer(storage.clone(), config, TableScorer::new(scores));
        (pipeline, storage)
    }

    #[tokio::test]
    async fn test_extract_generates_filtered_candidates() {
        let (pipeline, _) = pipeline(MockConfig::new(), &[]).await;

        let candidates = pipeline.extract().await.unwrap();

        let names: Vec<&str> = candidates.iter().map(Candidate::as_str).collect();
        // 泉 is water, 安 is unfavorable, 童 itself is metal
        assert_eq!(names, vec!["乐童", "禾童", "宇童"]);
    }

    #[tokio::test]
    async fn test_extract_with_unknown_anchor_fails() {
        let mut config = MockConfig::new();
        config.anchor = "龙".to_string();
        let (pipeline, _) = pipeline(config, &[]).await;

        assert!(matches!(pipeline.extract().await, Err(EtlError::AnchorNotFound { .. })));
    }

    #[tokio::test]
    async fn test_extract_without_dictionary_fails() {
        let pipeline = NamingPipeline::with_scorer(MockStorage::new(), MockConfig::new(), TableScorer::new(&[]));
        assert!(matches!(pipeline.extract().await, Err(EtlError::IoError(_))));
    }

    #[tokio::test]
    async fn test_transform_applies_threshold() {
        let (pipeline, _) = pipeline(MockConfig::new(), &[("乐童", "95"), ("禾童", "85.5")]).await;
        let candidates = pipeline.extract().await.unwrap();

        let report = pipeline.transform(candidates).await.unwrap();

        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].name, "乐童");
        assert_eq!(report.rejected, 1);
        assert_eq!(report.failed, vec!["宇童".to_string()]);
    }

    #[tokio::test]
    async fn test_load_writes_json_and_csv() {
        let (pipeline, storage) = pipeline(MockConfig::new(), &[("乐童", "95")]).await;
        let candidates = pipeline.extract().await.unwrap();
        let report = pipeline.transform(candidates).await.unwrap();

        let outputs = pipeline.load(&report).await.unwrap();

        let json_path = std::path::Path::new("test_output").join("result_-童.json");
        let csv_path = std::path::Path::new("test_output").join("result_-童.csv");
        assert_eq!(
            outputs,
            vec![
                json_path.to_string_lossy().to_string(),
                csv_path.to_string_lossy().to_string()
            ]
        );

        let csv = storage.get_file(&outputs[1]).await.unwrap();
        assert!(csv.starts_with(crate::core::report::UTF8_BOM));
        let json = storage.get_file(&outputs[0]).await.unwrap();
        let parsed: Vec<ScoreRecord> = serde_json::from_slice(&json).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].score, 95.0);
    }
}
