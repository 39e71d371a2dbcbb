//! Reference dataset statistics for the dashboard

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::inference::features::{self, FeatureVector, FEATURE_COUNT, FEATURE_LAYOUT};
use crate::inference::round2;
use crate::models::NewObservation;
use super::{parse_int, require, CsvTable, DatasetError, Record};

/// Column holding whether the child was reported before
pub const PAST_REPORT_COLUMN: &str = "과거신고이력";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReferenceStats {
    /// Rows in the reference dataset
    pub total_kids: usize,
    /// Rows with a past report
    pub danger_kids: usize,
    /// Column means of the encoded features, two decimals
    pub feature_means: FeatureVector,
}

impl ReferenceStats {
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let bytes = fs::read(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let stats = Self::from_table(&CsvTable::from_bytes(&bytes)?)?;

        tracing::info!(
            "Reference dataset loaded from {} ({} rows, {} past reports)",
            path.display(),
            stats.total_kids,
            stats.danger_kids
        );
        Ok(stats)
    }

    /// Like [`Self::load`], but a missing or broken file only costs the aggregates
    pub fn load_or_empty(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!("Reference dataset unavailable, dashboard totals will be zero: {}", e);
            Self::default()
        })
    }

    pub fn from_table(table: &CsvTable) -> Result<Self, DatasetError> {
        table.require_columns(FEATURE_LAYOUT)?;
        table.require_columns(&[PAST_REPORT_COLUMN])?;

        let mut sums = [0.0; FEATURE_COUNT];
        let mut danger_kids = 0;

        for record in table.records() {
            let encoded = features::encode(&observation_from(&record)?);
            for (sum, value) in sums.iter_mut().zip(encoded) {
                *sum += value;
            }
            if past_report(&record)? {
                danger_kids += 1;
            }
        }

        let total_kids = table.len();
        let mut feature_means = [0.0; FEATURE_COUNT];
        if total_kids > 0 {
            for (mean, sum) in feature_means.iter_mut().zip(sums) {
                *mean = round2(sum / total_kids as f64);
            }
        }

        Ok(Self {
            total_kids,
            danger_kids,
            feature_means,
        })
    }
}

fn observation_from(record: &Record<'_>) -> Result<NewObservation, DatasetError> {
    let label = |column: &str| record.get(column).unwrap_or_default().to_string();

    Ok(NewObservation {
        child_name: String::new(),
        age: parse_int(record, FEATURE_LAYOUT[0])?.unwrap_or(0),
        gender: label(FEATURE_LAYOUT[1]),
        attendance: label(FEATURE_LAYOUT[2]),
        negative_language: label(FEATURE_LAYOUT[3]),
        parental_aggression: label(FEATURE_LAYOUT[4]),
        contact_reaction: label(FEATURE_LAYOUT[5]),
        sibling: parse_int(record, FEATURE_LAYOUT[6])?.unwrap_or(0),
        income_level: label(FEATURE_LAYOUT[7]),
        emotional_state: label(FEATURE_LAYOUT[8]),
    })
}

fn past_report(record: &Record<'_>) -> Result<bool, DatasetError> {
    match require(record, PAST_REPORT_COLUMN)? {
        "있음" | "1" => Ok(true),
        "없음" | "0" => Ok(false),
        other => Err(DatasetError::BadLabel {
            line: record.line(),
            column: PAST_REPORT_COLUMN.to_string(),
            value: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "아동ID,나이,성별,출석패턴,부정언어표현,보호자공격성,신체접촉반응,형제자매수,소득수준,보호자정서상태,과거신고이력";

    fn table(rows: &[&str]) -> CsvTable {
        let mut text = HEADER.to_string();
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        CsvTable::parse(&text).unwrap()
    }

    #[test]
    fn test_stats_from_rows() {
        let stats = ReferenceStats::from_table(&table(&[
            "1,3,남,정상,낮음,없음,선호,0,높음,안정,없음",
            "2,5,여아,자주결석,높음,강함,공포,2,낮음,불안,있음",
            "3,6,남아,불규칙,중간,약함,회피,1,중간,우울,있음",
        ])).unwrap();

        assert_eq!(stats.total_kids, 3);
        assert_eq!(stats.danger_kids, 2);
        // age mean 14/3, contact mean (0+3+2)/3
        assert_eq!(stats.feature_means[0], 4.67);
        assert_eq!(stats.feature_means[1], 0.33);
        assert_eq!(stats.feature_means[5], 1.67);
        assert_eq!(stats.feature_means[6], 1.0);
    }

    #[test]
    fn test_empty_dataset_has_zero_means() {
        let stats = ReferenceStats::from_table(&table(&[])).unwrap();
        assert_eq!(stats, ReferenceStats::default());
    }

    #[test]
    fn test_rejects_unknown_past_report() {
        let err = ReferenceStats::from_table(&table(&["1,3,남,정상,낮음,없음,선호,0,높음,안정,모름"])).unwrap_err();
        assert!(matches!(err, DatasetError::BadLabel { line: 2, .. }));

        let missing = CsvTable::parse("나이,성별\n3,남").unwrap();
        assert!(matches!(
            ReferenceStats::from_table(&missing),
            Err(DatasetError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_load_or_empty() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}\n1,4.0,여,정상,낮음,없음,중립,1,중간,안정,0\n", HEADER).unwrap();

        let stats = ReferenceStats::load(file.path()).unwrap();
        assert_eq!(stats.total_kids, 1);
        assert_eq!(stats.feature_means[0], 4.0);

        let fallback = ReferenceStats::load_or_empty(Path::new("/nonexistent/reference.csv"));
        assert_eq!(fallback.total_kids, 0);
    }
}
