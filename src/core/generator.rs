use crate::domain::model::{AnchorPosition, Candidate, CharacterEntry, Element, Favorability};
use crate::utils::error::{EtlError, Result};

/// Grade contributed by the surname in every grade that includes it.
pub const SURNAME_GRADE: u32 = 13;

/// Inauspicious grade values. Person and earth grades must avoid them.
pub const FORBIDDEN_GRADES: [u32; 8] = [21, 23, 26, 28, 29, 33, 34, 39];

pub const EXCLUDED_ELEMENTS: [Element; 2] = [Element::Water, Element::Metal];

pub const DEFAULT_TOTAL_STROKE_LIMIT: u32 = 40;

pub fn is_forbidden(grade: u32) -> bool {
    FORBIDDEN_GRADES.contains(&grade)
}

fn grade_sum(parts: &[u32]) -> Option<u32> {
    parts.iter().try_fold(0u32, |acc, part| acc.checked_add(*part))
}

#[derive(Debug, Clone)]
pub struct GeneratorRules {
    pub anchor: String,
    pub position: AnchorPosition,
    pub total_stroke_limit: Option<u32>,
}

impl GeneratorRules {
    pub fn new(anchor: impl Into<String>, position: AnchorPosition) -> Self {
        Self {
            anchor: anchor.into(),
            position,
            total_stroke_limit: Some(DEFAULT_TOTAL_STROKE_LIMIT),
        }
    }

    pub fn with_total_stroke_limit(mut self, limit: Option<u32>) -> Self {
        self.total_stroke_limit = limit;
        self
    }
}

/// Build every candidate that passes the numerology filters, in dictionary
/// order. Duplicate dictionary rows yield duplicate candidates.
pub fn generate_candidates(entries: &[CharacterEntry], rules: &GeneratorRules) -> Result<Vec<Candidate>> {
    let anchor_strokes = entries
        .iter()
        .find(|entry| entry.simplified == rules.anchor)
        .map(|entry| entry.strokes)
        .ok_or_else(|| EtlError::AnchorNotFound {
            anchor: rules.anchor.clone(),
        })?;

    tracing::debug!(
        "Anchor '{}' has {} strokes, position {:?}",
        rules.anchor,
        anchor_strokes,
        rules.position
    );

    let mut candidates = Vec::new();

    if rules.position == AnchorPosition::Second {
        // 人格只取決於固定字
        let person_grade = grade_sum(&[SURNAME_GRADE, anchor_strokes]).ok_or_else(|| EtlError::ProcessingError {
            message: format!("stroke count {} of anchor '{}' is out of range", anchor_strokes, rules.anchor),
        })?;
        if is_forbidden(person_grade) {
            tracing::warn!(
                "Person grade {} of anchor '{}' is forbidden, no candidates possible",
                person_grade,
                rules.anchor
            );
            return Ok(candidates);
        }
    }

    for entry in entries {
        let (Some(person_grade), Some(earth_grade), Some(total_grade)) = (
            grade_sum(&[SURNAME_GRADE, entry.strokes]),
            grade_sum(&[entry.strokes, anchor_strokes]),
            grade_sum(&[SURNAME_GRADE, entry.strokes, anchor_strokes]),
        ) else {
            tracing::warn!("Skipping '{}': stroke count {} is out of range", entry.simplified, entry.strokes);
            continue;
        };

        if rules.position == AnchorPosition::First && is_forbidden(person_grade) {
            continue;
        }

        if EXCLUDED_ELEMENTS.contains(&entry.element) {
            continue;
        }

        if entry.favorability == Favorability::Unfavorable {
            continue;
        }

        if is_forbidden(earth_grade) {
            continue;
        }

        if let Some(limit) = rules.total_stroke_limit {
            if total_grade > limit {
                continue;
            }
        }

        let name = match rules.position {
            AnchorPosition::First => format!("{}{}", rules.anchor, entry.simplified),
            AnchorPosition::Second => format!("{}{}", entry.simplified, rules.anchor),
        };
        candidates.push(Candidate::new(name)?);
    }

    Ok(candidates)
}
