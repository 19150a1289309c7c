use crate::domain::model::{CharacterEntry, Element, Favorability};
use crate::utils::error::{EtlError, Result};

const SIMPLIFIED_COL: usize = 1;
const TRADITIONAL_COL: usize = 2;
const FAVORABILITY_COL: usize = 7;
const ELEMENT_COL: usize = 8;
const STROKES_COL: usize = 10;

/// Upper bound for a single character's stroke count. Real characters stay far
/// below it; anything above is a corrupt row.
pub const MAX_STROKES: u32 = 99;

/// Parse the character dictionary CSV. The header row is skipped and file
/// order is preserved.
///
/// A stroke count that is not a number in `0..=MAX_STROKES` aborts the load:
/// the numerology filters need exact stroke counts, so a partially loaded
/// dictionary is not usable. Unrecognised element tags load as
/// [`Element::Unknown`].
pub fn parse_dictionary(data: &[u8]) -> Result<Vec<CharacterEntry>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(data);

    let mut entries = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        // 表頭佔第一行
        let row = index + 2;

        let field = |col: usize| {
            record.get(col).ok_or_else(|| EtlError::DictionaryError {
                row,
                message: format!("expected at least {} columns, found {}", STROKES_COL + 1, record.len()),
            })
        };

        let raw_strokes = field(STROKES_COL)?;
        let strokes = raw_strokes
            .trim()
            .parse::<u32>()
            .map_err(|e| EtlError::DictionaryError {
                row,
                message: format!("stroke count '{}' is not a number: {}", raw_strokes, e),
            })?;
        if strokes > MAX_STROKES {
            return Err(EtlError::DictionaryError {
                row,
                message: format!("stroke count {} exceeds {}", strokes, MAX_STROKES),
            });
        }

        entries.push(CharacterEntry {
            simplified: field(SIMPLIFIED_COL)?.trim().to_string(),
            traditional: field(TRADITIONAL_COL)?.trim().to_string(),
            favorability: Favorability::from_tag(field(FAVORABILITY_COL)?),
            element: Element::from_tag(field(ELEMENT_COL)?),
            strokes,
        });
    }

    tracing::debug!("Parsed {} dictionary entries", entries.len());
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::generator::{generate_candidates, GeneratorRules};
    use crate::domain::model::AnchorPosition;

    const HEADER: &str = "id,simplified,traditional,pinyin,radical,structure,meaning,jixiong,wuxing,kangxi,bihua\n";

    fn row(simplified: &str, traditional: &str, jixiong: &str, wuxing: &str, bihua: &str) -> String {
        format!("0,{simplified},{traditional},,,,,{jixiong},{wuxing},,{bihua}\n")
    }

    #[test]
    fn test_parse_keeps_file_order() {
        let csv = format!(
            "{HEADER}{}{}{}",
            row("乐", "樂", "吉", "木", "15"),
            row("童", "童", "吉", "金", "12"),
            row("杀", "殺", "凶", "金", "11"),
        );

        let entries = parse_dictionary(csv.as_bytes()).unwrap();

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].simplified, "乐");
        assert_eq!(entries[0].traditional, "樂");
        assert_eq!(entries[0].strokes, 15);
        assert_eq!(entries[0].element, Element::Wood);
        assert_eq!(entries[1].simplified, "童");
        assert_eq!(entries[2].favorability, Favorability::Unfavorable);
    }

    #[test]
    fn test_header_only_is_empty() {
        assert!(parse_dictionary(HEADER.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn test_non_numeric_strokes_is_fatal() {
        let csv = format!("{HEADER}{}{}", row("乐", "樂", "吉", "木", "15"), row("童", "童", "吉", "金", "十二"));

        let err = parse_dictionary(csv.as_bytes()).unwrap_err();

        match err {
            EtlError::DictionaryError { row, message } => {
                assert_eq!(row, 3);
                assert!(message.contains("十二"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_negative_strokes_is_fatal() {
        let csv = format!("{HEADER}{}", row("乐", "樂", "吉", "木", "-1"));
        assert!(matches!(
            parse_dictionary(csv.as_bytes()),
            Err(EtlError::DictionaryError { .. })
        ));
    }

    #[test]
    fn test_blank_element_loads_and_generates() {
        let csv = format!(
            "{HEADER}{}{}{}",
            row("乐", "樂", "吉", "木", "15"),
            row("童", "童", "吉", "金", "12"),
            row("禾", "禾", "吉", "", "5"),
        );

        let entries = parse_dictionary(csv.as_bytes()).unwrap();
        assert_eq!(entries[2].element, Element::Unknown);

        let rules = GeneratorRules::new("童", AnchorPosition::Second);
        let names: Vec<String> = generate_candidates(&entries, &rules)
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(names, vec!["乐童", "禾童"]);
    }

    #[test]
    fn test_stroke_count_bound() {
        let at_bound = format!("{HEADER}{}", row("乐", "樂", "吉", "木", &MAX_STROKES.to_string()));
        assert_eq!(parse_dictionary(at_bound.as_bytes()).unwrap()[0].strokes, MAX_STROKES);

        let huge = format!("{HEADER}{}{}", row("童", "童", "吉", "金", "12"), row("乐", "樂", "吉", "木", "4294967295"));
        match parse_dictionary(huge.as_bytes()) {
            Err(EtlError::DictionaryError { row, message }) => {
                assert_eq!(row, 3);
                assert!(message.contains("4294967295"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_short_rows_are_rejected() {
        let csv = "a,b,c\n1,乐,樂\n";
        assert!(parse_dictionary(csv.as_bytes()).is_err());
    }
}
