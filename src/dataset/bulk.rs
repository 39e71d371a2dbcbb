//! Bulk observation upload

use validator::Validate;

use crate::forms;
use crate::inference::features::{Category, ContactReaction, EmotionalState, Level};
use crate::models::NewObservation;
use super::{parse_int, require, CsvTable, DatasetError, Record};

/// Columns every upload must carry
pub const REQUIRED_COLUMNS: &[&str] = &["아동이름", "나이", "성별", "출석", "부정언어표현", "보호자공격성"];

/// One uploaded row, stored without running the model
#[derive(Debug, Clone, PartialEq)]
pub struct BulkRow {
    pub observation: NewObservation,
    pub is_danger: bool,
}

impl BulkRow {
    pub fn from_record(record: &Record<'_>) -> Result<Self, DatasetError> {
        let age = parse_int(record, "나이")?.ok_or_else(|| DatasetError::EmptyField {
            line: record.line(),
            column: "나이".to_string(),
        })?;

        let observation = NewObservation {
            child_name: require(record, "아동이름")?.to_string(),
            age,
            gender: label(record, "성별", None)?,
            attendance: label(record, "출석", None)?,
            negative_language: label(record, "부정언어표현", None)?,
            parental_aggression: label(record, "보호자공격성", None)?,
            contact_reaction: label(record, "신체접촉반응", Some(ContactReaction::Neutral.label()))?,
            sibling: parse_int(record, "형제자매수")?.unwrap_or(0),
            income_level: label(record, "소득수준", Some(Level::Medium.label()))?,
            emotional_state: label(record, "보호자정서상태", Some(EmotionalState::Stable.label()))?,
        };

        // Same rules as the web form; labels are stored as text
        observation.validate().map_err(|e| DatasetError::Invalid {
            line: record.line(),
            message: forms::describe(&e),
        })?;

        Ok(Self {
            observation,
            is_danger: record.get("is_danger").map(parse_flag).unwrap_or(false),
        })
    }
}

/// Parse an uploaded file; the first bad row rejects the whole upload
pub fn parse_upload(bytes: &[u8]) -> Result<Vec<BulkRow>, DatasetError> {
    let table = CsvTable::from_bytes(bytes)?;
    table.require_columns(REQUIRED_COLUMNS)?;
    table.records().map(|r| BulkRow::from_record(&r)).collect()
}

/// Required label, or `default` when the optional cell is empty
fn label(record: &Record<'_>, column: &str, default: Option<&str>) -> Result<String, DatasetError> {
    match (record.get(column), default) {
        (Some(value), _) => Ok(value.to_string()),
        (None, Some(default)) => Ok(default.to_string()),
        (None, None) => require(record, column).map(str::to_string),
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "y")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_columns_default() {
        let rows = parse_upload("아동이름,나이,성별,출석,부정언어표현,보호자공격성\n최민준,4,남아,정상,낮음,없음\n".as_bytes()).unwrap();

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.observation.child_name, "최민준");
        assert_eq!(row.observation.contact_reaction, "중립");
        assert_eq!(row.observation.sibling, 0);
        assert_eq!(row.observation.income_level, "중간");
        assert_eq!(row.observation.emotional_state, "안정");
        assert!(!row.is_danger);
    }

    #[test]
    fn test_full_row_with_flag() {
        let csv = "아동이름,나이,성별,출석,부정언어표현,보호자공격성,신체접촉반응,형제자매수,소득수준,보호자정서상태,is_danger\n\
                   정서연,6,여아,자주결석,높음,강함,공포,3,낮음,우울,True\n";
        let rows = parse_upload(csv.as_bytes()).unwrap();

        assert!(rows[0].is_danger);
        assert_eq!(rows[0].observation.sibling, 3);
        assert_eq!(rows[0].observation.contact_reaction, "공포");
    }

    #[test]
    fn test_bad_rows_rejected() {
        let unknown = parse_upload("아동이름,나이,성별,출석,부정언어표현,보호자공격성\n김,4,남아,가끔,낮음,없음\n".as_bytes());
        assert!(matches!(unknown, Err(DatasetError::Invalid { line: 2, .. })));

        let no_age = parse_upload("아동이름,나이,성별,출석,부정언어표현,보호자공격성\n김,,남아,정상,낮음,없음\n".as_bytes());
        assert!(matches!(no_age, Err(DatasetError::EmptyField { .. })));

        let missing_column = parse_upload("아동이름,나이\n김,4\n".as_bytes());
        assert!(matches!(missing_column, Err(DatasetError::MissingColumn(c)) if c == "성별"));
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("TRUE"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("False"));
        assert!(!parse_flag("위험"));
    }
}
