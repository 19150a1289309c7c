use crate::core::coordinator::DEFAULT_WORKERS;
use crate::core::scorer::{DEFAULT_ENDPOINT, DEFAULT_SURNAME};
use crate::domain::model::{AnchorPosition, ExtractionPatterns};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub source: SourceConfig,
    pub naming: NamingConfig,
    #[serde(default)]
    pub filters: FilterConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub extraction: ExtractionPatterns,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_surname")]
    pub surname: String,
    pub timeout_seconds: Option<u64>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            surname: default_surname(),
            timeout_seconds: None,
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_surname() -> String {
    DEFAULT_SURNAME.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamingConfig {
    pub anchor: String,
    #[serde(default)]
    pub anchor_position: AnchorPosition,
    pub dictionary: String,
}

/// Leaving a limit out disables that filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    pub total_stroke_limit: Option<u32>,
    pub score_threshold: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub concurrent_requests: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub log_level: Option<String>,
    pub json_logs: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;
        Ok(toml::from_str(&processed_content)?)
    }

    /// 替換環境變數 (例如 ${NAMING_ANCHOR})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.json_logs)
            .unwrap_or(false)
    }

    pub fn log_level(&self) -> Option<&str> {
        self.monitoring.as_ref().and_then(|m| m.log_level.as_deref())
    }
}

impl ConfigProvider for TomlConfig {
    fn endpoint(&self) -> &str {
        &self.source.endpoint
    }

    fn surname(&self) -> &str {
        &self.source.surname
    }

    fn anchor(&self) -> &str {
        &self.naming.anchor
    }

    fn anchor_position(&self) -> AnchorPosition {
        self.naming.anchor_position
    }

    fn dictionary_path(&self) -> &str {
        &self.naming.dictionary
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn total_stroke_limit(&self) -> Option<u32> {
        self.filters.total_stroke_limit
    }

    fn score_threshold(&self) -> Option<f64> {
        self.filters.score_threshold
    }

    fn concurrent_requests(&self) -> usize {
        self.pipeline.concurrent_requests.unwrap_or(DEFAULT_WORKERS)
    }

    fn request_timeout(&self) -> Option<Duration> {
        self.source.timeout_seconds.map(Duration::from_secs)
    }

    fn extraction_patterns(&self) -> ExtractionPatterns {
        self.extraction.clone()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("source.endpoint", &self.source.endpoint)?;
        validation::validate_non_empty_string("source.surname", &self.source.surname)?;
        validation::validate_single_char("naming.anchor", &self.naming.anchor)?;
        validation::validate_path("naming.dictionary", &self.naming.dictionary)?;
        validation::validate_file_extensions(
            "naming.dictionary",
            std::slice::from_ref(&self.naming.dictionary),
            &["csv"],
        )?;
        validation::validate_path("output.path", &self.output.path)?;

        if let Some(concurrent) = self.pipeline.concurrent_requests {
            validation::validate_positive_number("pipeline.concurrent_requests", concurrent, 1)?;
        }
        if let Some(timeout) = self.source.timeout_seconds {
            validation::validate_positive_number("source.timeout_seconds", timeout as usize, 1)?;
        }
        if let Some(threshold) = self.filters.score_threshold {
            validation::validate_range("filters.score_threshold", threshold, 0.0, 100.0)?;
        }

        // 先編譯一次，讓錯誤的 pattern 在啟動時就被發現
        crate::core::extraction::ExtractionRules::compile(&self.extraction)?;

        Ok(())
    }
}
