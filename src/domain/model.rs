use crate::utils::error::{EtlError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Favorability {
    Favorable,
    Unfavorable,
    Neutral,
}

impl Favorability {
    /// `吉` and `凶` are the only tags with a meaning; anything else is neutral.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim() {
            "吉" => Favorability::Favorable,
            "凶" => Favorability::Unfavorable,
            _ => Favorability::Neutral,
        }
    }
}

/// 五行
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Element {
    Metal,
    Wood,
    Water,
    Fire,
    Earth,
    /// Blank or unrecognised tag. Never excluded by the element filter.
    Unknown,
}

impl Element {
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim() {
            "金" => Element::Metal,
            "木" => Element::Wood,
            "水" => Element::Water,
            "火" => Element::Fire,
            "土" => Element::Earth,
            _ => Element::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterEntry {
    pub simplified: String,
    pub traditional: String,
    pub favorability: Favorability,
    pub element: Element,
    pub strokes: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum AnchorPosition {
    /// anchor + entry
    First,
    /// entry + anchor
    #[default]
    Second,
}

/// A two-character given name. Construction enforces the length.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Candidate(String);

impl Candidate {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.chars().count() != 2 {
            return Err(EtlError::InvalidCandidate { name });
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One scored name as reported by the scoring service.
///
/// Field names follow the pinyin section labels of the report page; they are
/// serialized in PascalCase so JSON keys and CSV headers line up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ScoreRecord {
    pub name: String,

    /// 天格 人格 地格 外格 总格
    pub tiange: String,
    pub renge: String,
    pub dige: String,
    pub waige: String,
    pub zongge: String,

    /// 三才配置
    pub sancai: String,
    pub jichuyun: String,
    pub chenggongyun: String,
    pub shejiaoyun: String,

    pub rengeanshi: String,
    pub digeanshi: String,
    pub waigeanshi: String,
    pub zonggeanshi: String,

    pub zongping: String,
    pub score: f64,
}

/// What a worker reports back to the collector for one candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreOutcome {
    Accepted(ScoreRecord),
    Rejected { name: String, score: f64 },
    Failed { name: String },
}

/// Aggregate built by the collector.
///
/// `records` is in receive order, which is not candidate order.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub records: Vec<ScoreRecord>,
    pub rejected: usize,
    pub failed: Vec<String>,
    pub total: usize,
}

impl BatchReport {
    pub fn with_total(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    pub fn absorb(&mut self, outcome: ScoreOutcome) {
        match outcome {
            ScoreOutcome::Accepted(record) => self.records.push(record),
            ScoreOutcome::Rejected { .. } => self.rejected += 1,
            ScoreOutcome::Failed { name } => self.failed.push(name),
        }
    }

    pub fn processed(&self) -> usize {
        self.records.len() + self.rejected + self.failed.len()
    }
}

/// Returned by the engine once a run finishes.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub candidates: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub failed: Vec<String>,
    pub outputs: Vec<String>,
}

/// Markers used to pull fields out of the scoring page.
///
/// All patterns are line-oriented regexes: `.` does not cross a newline, so a
/// match covers the marked line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionPatterns {
    pub five_grades: String,
    pub sancai: String,
    pub jichuyun: String,
    pub chenggongyun: String,
    pub shejiaoyun: String,
    pub rengeanshi: String,
    pub digeanshi: String,
    pub waigeanshi: String,
    pub zonggeanshi: String,
    pub zongping: String,
    pub score: String,
    pub field_separator: String,
}

impl Default for ExtractionPatterns {
    fn default() -> Self {
        Self {
            five_grades: r".*『数理』.*".to_string(),
            sancai: r".*您姓名的天地人三才配置.*".to_string(),
            jichuyun: r".*<B>基础运</B>.*".to_string(),
            chenggongyun: r".*<B>成功运</B>.*".to_string(),
            shejiaoyun: r".*<B>社交运</B>.*".to_string(),
            rengeanshi: r".*人格\d+之数理暗示.*".to_string(),
            digeanshi: r".*地格\d+之数理暗示.*".to_string(),
            waigeanshi: r".*外格\d+之数理暗示.*".to_string(),
            zonggeanshi: r".*总格\d+之数理暗示.*".to_string(),
            zongping: r".*根据姓名网·名字测试打.*".to_string(),
            score: r">[1-9][0-9]*([\.][0-9])?<".to_string(),
            field_separator: "：".to_string(),
        }
    }
}
