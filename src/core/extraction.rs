//! Pattern-based extraction of the scoring page.
//!
//! The page is not parsed as a document. Every field lives on a line carrying
//! a known marker, and the markers come from [`ExtractionPatterns`] so they can
//! be changed without touching code.

use crate::domain::model::{ExtractionPatterns, ScoreRecord};
use crate::utils::error::{EtlError, Result};
use regex::Regex;

pub const GRADE_COUNT: usize = 5;

const PARAGRAPH_BREAK: &str = "</p><p>";
const PARAGRAPH_OPEN: &str = "<p>";
const PARAGRAPH_CLOSE: &str = "</p>";

/// Why a page could not be turned into a [`ScoreRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionFailure {
    GradeCount(usize),
    MissingScore,
}

#[derive(Debug, Clone)]
pub struct ExtractionRules {
    five_grades: Regex,
    sancai: Regex,
    jichuyun: Regex,
    chenggongyun: Regex,
    shejiaoyun: Regex,
    rengeanshi: Regex,
    digeanshi: Regex,
    waigeanshi: Regex,
    zonggeanshi: Regex,
    zongping: Regex,
    score: Regex,
    field_separator: String,
}

fn compile(field: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| EtlError::InvalidConfigValueError {
        field: format!("extraction.{}", field),
        value: pattern.to_string(),
        reason: e.to_string(),
    })
}

impl ExtractionRules {
    pub fn compile(patterns: &ExtractionPatterns) -> Result<Self> {
        if patterns.field_separator.is_empty() {
            return Err(EtlError::InvalidConfigValueError {
                field: "extraction.field_separator".to_string(),
                value: String::new(),
                reason: "Separator cannot be empty".to_string(),
            });
        }

        Ok(Self {
            five_grades: compile("five_grades", &patterns.five_grades)?,
            sancai: compile("sancai", &patterns.sancai)?,
            jichuyun: compile("jichuyun", &patterns.jichuyun)?,
            chenggongyun: compile("chenggongyun", &patterns.chenggongyun)?,
            shejiaoyun: compile("shejiaoyun", &patterns.shejiaoyun)?,
            rengeanshi: compile("rengeanshi", &patterns.rengeanshi)?,
            digeanshi: compile("digeanshi", &patterns.digeanshi)?,
            waigeanshi: compile("waigeanshi", &patterns.waigeanshi)?,
            zonggeanshi: compile("zonggeanshi", &patterns.zonggeanshi)?,
            zongping: compile("zongping", &patterns.zongping)?,
            score: compile("score", &patterns.score)?,
            field_separator: patterns.field_separator.clone(),
        })
    }

    /// Turn a page body into a record for `name`.
    ///
    /// Pure: the same body always gives the same record.
    pub fn extract(&self, name: &str, body: &str) -> std::result::Result<ScoreRecord, ExtractionFailure> {
        let grades: Vec<&str> = self.five_grades.find_iter(body).map(|m| m.as_str()).collect();
        if grades.len() != GRADE_COUNT {
            return Err(ExtractionFailure::GradeCount(grades.len()));
        }

        let zongping_line = first_match(&self.zongping, body);
        let score = self.parse_score(zongping_line).ok_or(ExtractionFailure::MissingScore)?;

        Ok(ScoreRecord {
            name: name.to_string(),
            tiange: clean_segment(grades[0]),
            renge: clean_segment(grades[1]),
            dige: clean_segment(grades[2]),
            waige: clean_segment(grades[3]),
            zongge: clean_segment(grades[4]),
            sancai: clean_segment(first_match(&self.sancai, body)),
            jichuyun: self.labeled(&self.jichuyun, body),
            chenggongyun: self.labeled(&self.chenggongyun, body),
            shejiaoyun: self.labeled(&self.shejiaoyun, body),
            rengeanshi: self.labeled(&self.rengeanshi, body),
            digeanshi: self.labeled(&self.digeanshi, body),
            waigeanshi: self.labeled(&self.waigeanshi, body),
            zonggeanshi: self.labeled(&self.zonggeanshi, body),
            zongping: clean_segment(zongping_line),
            score,
        })
    }

    /// Value after the field separator of the marked line. A line without a
    /// separator has no value.
    fn labeled(&self, pattern: &Regex, body: &str) -> String {
        let line = first_match(pattern, body);
        let value = line
            .split_once(self.field_separator.as_str())
            .map(|(_, after)| after)
            .unwrap_or("");
        clean_segment(&value.replace(PARAGRAPH_CLOSE, ""))
    }

    fn parse_score(&self, zongping_line: &str) -> Option<f64> {
        let token = self.score.find(zongping_line)?.as_str();
        token
            .trim_start_matches('>')
            .trim_end_matches('<')
            .parse::<f64>()
            .ok()
            .filter(|score| *score > 0.0)
    }
}

fn first_match<'a>(pattern: &Regex, body: &'a str) -> &'a str {
    pattern.find(body).map(|m| m.as_str()).unwrap_or("")
}

/// Trim and flatten paragraph markup; paragraph breaks become newlines.
pub fn clean_segment(segment: &str) -> String {
    segment
        .trim()
        .replace(PARAGRAPH_BREAK, "\n")
        .replace(PARAGRAPH_OPEN, "")
        .replace(PARAGRAPH_CLOSE, "")
}
