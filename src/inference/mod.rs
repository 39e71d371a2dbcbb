//! Inference Module - risk prediction from a pre-trained forest
//!
//! `features` turns observation labels into model inputs, `forest` walks
//! the exported trees and `bundle` ties both to the artifact on disk.

pub mod features;
pub mod forest;
pub mod bundle;

pub use bundle::{BundleError, Classification, ModelBundle, RiskAssessment};
pub use features::{FeatureVector, FEATURE_COUNT, FEATURE_LAYOUT};

/// Outcome label stored with every prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Danger,
    Normal,
}

impl Verdict {
    pub fn from_flag(is_danger: bool) -> Self {
        if is_danger {
            Verdict::Danger
        } else {
            Verdict::Normal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Danger => "위험",
            Verdict::Normal => "정상",
        }
    }
}

/// Round to two decimals, ties to even on the exact binary value.
///
/// Float formatting is correctly rounded, so `28.125` becomes `28.12`.
pub fn round2(value: f64) -> f64 {
    format!("{:.2}", value).parse().unwrap_or(value)
}

/// Decimal display that keeps one fractional digit for whole numbers (`85.0`)
pub fn format_decimal(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(87.3456), 87.35);
        assert_eq!(round2(2.0), 2.0);
        assert_eq!(round2(0.333333), 0.33);
    }

    #[test]
    fn test_round2_ties_to_even() {
        // 9/32 of a percent scale, exactly representable
        assert_eq!(round2(9.0 / 32.0 * 100.0), 28.12);
        assert_eq!(round2(28.375), 28.38);
        assert_eq!(round2(0.125), 0.12);
    }

    #[test]
    fn test_format_decimal() {
        assert_eq!(format_decimal(85.0), "85.0");
        assert_eq!(format_decimal(87.34), "87.34");
    }

    #[test]
    fn test_verdict_labels() {
        assert_eq!(Verdict::from_flag(true).as_str(), "위험");
        assert_eq!(Verdict::from_flag(false).as_str(), "정상");
    }
}
