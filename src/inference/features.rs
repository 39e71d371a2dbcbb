//! Feature Layout - categorical labels to model inputs
//!
//! The forest was trained on 9 columns in a fixed order. Categorical
//! columns were label-encoded with the code tables below; any change here
//! must be matched by a retrained model bundle.

use crate::models::NewObservation;

// ============================================================================
// FEATURE LAYOUT
// ============================================================================

/// Training column names, in vector order
pub const FEATURE_LAYOUT: &[&str] = &[
    "나이",           // 0: age in years
    "성별",           // 1: gender
    "출석패턴",       // 2: attendance pattern
    "부정언어표현",   // 3: negative language
    "보호자공격성",   // 4: guardian aggression
    "신체접촉반응",   // 5: reaction to physical contact
    "형제자매수",     // 6: number of siblings
    "소득수준",       // 7: household income level
    "보호자정서상태", // 8: guardian emotional state
];

/// Total number of features
pub const FEATURE_COUNT: usize = 9;

/// One encoded model input
pub type FeatureVector = [f64; FEATURE_COUNT];

// ============================================================================
// CATEGORIES
// ============================================================================

/// A categorical observation field with a fixed label/code table
pub trait Category: Sized + Copy + 'static {
    /// Every variant, in code order
    const ALL: &'static [Self];

    /// Code used when a label is missing or not in the table
    const DEFAULT_CODE: u8;

    fn label(self) -> &'static str;

    fn code(self) -> u8;

    fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.iter().copied().find(|c| c.label() == label)
    }

    /// Alternate spellings accepted only when encoding dataset rows
    fn from_alias(_label: &str) -> Option<Self> {
        None
    }

    /// Labels offered in forms
    fn choices() -> Vec<&'static str> {
        Self::ALL.iter().map(|c| c.label()).collect()
    }

    /// Encode a label; already-numeric codes pass through, anything else
    /// falls back to [`Self::DEFAULT_CODE`]
    fn code_or_default(label: &str) -> u8 {
        if let Some(category) = Self::from_label(label).or_else(|| Self::from_alias(label)) {
            return category.code();
        }
        label
            .trim()
            .parse::<u8>()
            .ok()
            .filter(|code| Self::ALL.iter().any(|c| c.code() == *code))
            .unwrap_or(Self::DEFAULT_CODE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Boy,
    Girl,
}

impl Category for Gender {
    const ALL: &'static [Self] = &[Self::Boy, Self::Girl];
    const DEFAULT_CODE: u8 = 0;

    fn label(self) -> &'static str {
        match self {
            Self::Boy => "남아",
            Self::Girl => "여아",
        }
    }

    fn code(self) -> u8 {
        match self {
            Self::Boy => 0,
            Self::Girl => 1,
        }
    }

    // The reference dataset uses the short forms
    fn from_alias(label: &str) -> Option<Self> {
        match label.trim() {
            "남" => Some(Self::Boy),
            "여" => Some(Self::Girl),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attendance {
    Normal,
    FrequentAbsence,
    Irregular,
}

impl Category for Attendance {
    const ALL: &'static [Self] = &[Self::Normal, Self::FrequentAbsence, Self::Irregular];
    const DEFAULT_CODE: u8 = 0;

    fn label(self) -> &'static str {
        match self {
            Self::Normal => "정상",
            Self::FrequentAbsence => "자주결석",
            Self::Irregular => "불규칙",
        }
    }

    fn code(self) -> u8 {
        self as u8
    }
}

/// Three-step scale shared by negative language and income level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    Medium,
    High,
}

impl Category for Level {
    const ALL: &'static [Self] = &[Self::Low, Self::Medium, Self::High];
    const DEFAULT_CODE: u8 = 1;

    fn label(self) -> &'static str {
        match self {
            Self::Low => "낮음",
            Self::Medium => "중간",
            Self::High => "높음",
        }
    }

    fn code(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggression {
    Absent,
    Weak,
    Strong,
}

impl Category for Aggression {
    const ALL: &'static [Self] = &[Self::Absent, Self::Weak, Self::Strong];
    const DEFAULT_CODE: u8 = 1;

    fn label(self) -> &'static str {
        match self {
            Self::Absent => "없음",
            Self::Weak => "약함",
            Self::Strong => "강함",
        }
    }

    fn code(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactReaction {
    Preference,
    Neutral,
    Avoidance,
    Fear,
}

impl Category for ContactReaction {
    const ALL: &'static [Self] = &[Self::Preference, Self::Neutral, Self::Avoidance, Self::Fear];
    const DEFAULT_CODE: u8 = 1;

    fn label(self) -> &'static str {
        match self {
            Self::Preference => "선호",
            Self::Neutral => "중립",
            Self::Avoidance => "회피",
            Self::Fear => "공포",
        }
    }

    fn code(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmotionalState {
    Stable,
    Depressed,
    Anxious,
}

impl Category for EmotionalState {
    const ALL: &'static [Self] = &[Self::Stable, Self::Depressed, Self::Anxious];
    const DEFAULT_CODE: u8 = 0;

    fn label(self) -> &'static str {
        match self {
            Self::Stable => "안정",
            Self::Depressed => "우울",
            Self::Anxious => "불안",
        }
    }

    fn code(self) -> u8 {
        self as u8
    }
}

// ============================================================================
// ENCODING
// ============================================================================

/// Encode an observation into model input order
pub fn encode(obs: &NewObservation) -> FeatureVector {
    [
        obs.age as f64,
        Gender::code_or_default(&obs.gender) as f64,
        Attendance::code_or_default(&obs.attendance) as f64,
        Level::code_or_default(&obs.negative_language) as f64,
        Aggression::code_or_default(&obs.parental_aggression) as f64,
        ContactReaction::code_or_default(&obs.contact_reaction) as f64,
        obs.sibling as f64,
        Level::code_or_default(&obs.income_level) as f64,
        EmotionalState::code_or_default(&obs.emotional_state) as f64,
    ]
}
