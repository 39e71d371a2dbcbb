//! Observation form parsing and validation

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::inference::features::{Aggression, Attendance, Category, ContactReaction, EmotionalState, Gender, Level};
use crate::models::NewObservation;

/// Raw form submission; numbers arrive as text so bad input can be echoed back
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservationForm {
    pub child_name: String,
    pub age: String,
    pub gender: String,
    pub attendance: String,
    pub negative_language: String,
    pub parental_aggression: String,
    pub contact_reaction: String,
    pub sibling: String,
    pub income_level: String,
    pub emotional_state: String,
}

/// Field name -> first error message
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormErrors(BTreeMap<String, String>);

impl FormErrors {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Keeps an earlier message for the same field
    fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_insert_with(|| message.into());
    }

    fn merge(&mut self, errors: &ValidationErrors) {
        for (field, list) in errors.field_errors() {
            let message = list
                .first()
                .and_then(|e| e.message.as_ref())
                .map(|m| m.to_string())
                .unwrap_or_else(|| "올바른 값을 입력하세요.".to_string());
            self.add(&field.to_string(), message);
        }
    }
}

impl ObservationForm {
    pub fn clean(&self) -> Result<NewObservation, FormErrors> {
        let mut errors = FormErrors::default();

        let age = parse_number(&self.age, "age", &mut errors);
        let sibling = parse_number(&self.sibling, "sibling", &mut errors);

        let observation = NewObservation {
            child_name: self.child_name.trim().to_string(),
            age,
            gender: self.gender.trim().to_string(),
            attendance: self.attendance.trim().to_string(),
            negative_language: self.negative_language.trim().to_string(),
            parental_aggression: self.parental_aggression.trim().to_string(),
            contact_reaction: self.contact_reaction.trim().to_string(),
            sibling,
            income_level: self.income_level.trim().to_string(),
            emotional_state: self.emotional_state.trim().to_string(),
        };

        if let Err(e) = observation.validate() {
            errors.merge(&e);
        }

        if errors.is_empty() {
            Ok(observation)
        } else {
            Err(errors)
        }
    }
}

fn parse_number(value: &str, field: &str, errors: &mut FormErrors) -> i32 {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, "이 필드는 필수 항목입니다.");
        return 0;
    }
    value.parse().unwrap_or_else(|_| {
        errors.add(field, "정수를 입력하세요.");
        0
    })
}

/// Flatten validation errors for log lines and upload messages
pub fn describe(errors: &ValidationErrors) -> String {
    let mut collected = FormErrors::default();
    collected.merge(errors);
    collected
        .iter()
        .map(|(field, message)| format!("{}: {}", field, message))
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// CHOICE VALIDATORS
// ============================================================================

fn choice<C: Category>(value: &str) -> Result<(), ValidationError> {
    if C::from_label(value).is_some() {
        return Ok(());
    }
    let mut error = ValidationError::new("invalid_choice");
    error.message = Some(format!("올바르게 선택해 주세요. '{}'은(는) 선택할 수 없는 항목입니다.", value).into());
    Err(error)
}

pub fn validate_gender(value: &str) -> Result<(), ValidationError> {
    choice::<Gender>(value)
}

pub fn validate_attendance(value: &str) -> Result<(), ValidationError> {
    choice::<Attendance>(value)
}

pub fn validate_level(value: &str) -> Result<(), ValidationError> {
    choice::<Level>(value)
}

pub fn validate_aggression(value: &str) -> Result<(), ValidationError> {
    choice::<Aggression>(value)
}

pub fn validate_contact_reaction(value: &str) -> Result<(), ValidationError> {
    choice::<ContactReaction>(value)
}

pub fn validate_emotional_state(value: &str) -> Result<(), ValidationError> {
    choice::<EmotionalState>(value)
}
