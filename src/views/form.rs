//! Observation form fields shared by the dashboard and the prediction page

use crate::forms::{FormErrors, ObservationForm};
use crate::inference::features::{Aggression, Attendance, Category, ContactReaction, EmotionalState, Gender, Level};
use super::escape_html;

/// Render every observation input, keeping submitted values and field errors
pub fn observation_fields(form: &ObservationForm, errors: &FormErrors) -> String {
    [
        text_input("child_name", "아동 이름", &form.child_name, "text", errors),
        text_input("age", "나이", &form.age, "number", errors),
        select("gender", "성별", &Gender::choices(), &form.gender, errors),
        select("attendance", "출석 패턴", &Attendance::choices(), &form.attendance, errors),
        select("negative_language", "부정 언어 표현", &Level::choices(), &form.negative_language, errors),
        select("parental_aggression", "보호자 공격성", &Aggression::choices(), &form.parental_aggression, errors),
        select("contact_reaction", "신체 접촉 반응", &ContactReaction::choices(), &form.contact_reaction, errors),
        text_input("sibling", "형제자매 수", &form.sibling, "number", errors),
        select("income_level", "소득 수준", &Level::choices(), &form.income_level, errors),
        select("emotional_state", "보호자 정서 상태", &EmotionalState::choices(), &form.emotional_state, errors),
    ]
    .join("\n")
}

fn field_error(name: &str, errors: &FormErrors) -> String {
    errors
        .get(name)
        .map(|e| format!(r#"<span class="error">{}</span>"#, escape_html(e)))
        .unwrap_or_default()
}

fn text_input(name: &str, label: &str, value: &str, kind: &str, errors: &FormErrors) -> String {
    format!(
        r#"<label class="field">{label}
            <input type="{kind}" name="{name}" value="{value}" required>
            {error}
        </label>"#,
        label = label,
        kind = kind,
        name = name,
        value = escape_html(value),
        error = field_error(name, errors),
    )
}

fn select(name: &str, label: &str, choices: &[&str], selected: &str, errors: &FormErrors) -> String {
    let options: String = choices
        .iter()
        .map(|choice| {
            let marker = if *choice == selected { " selected" } else { "" };
            format!(r#"<option value="{0}"{1}>{0}</option>"#, choice, marker)
        })
        .collect();

    format!(
        r#"<label class="field">{label}
            <select name="{name}" required>
                <option value="">선택하세요</option>
                {options}
            </select>
            {error}
        </label>"#,
        label = label,
        name = name,
        options = options,
        error = field_error(name, errors),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::tests::filled_form;

    #[test]
    fn test_fields_keep_values() {
        let html = observation_fields(&filled_form(), &FormErrors::default());

        assert!(html.contains(r#"name="child_name" value=" 한지우 ""#));
        assert!(html.contains(r#"<option value="자주결석" selected>자주결석</option>"#));
        assert!(html.contains(r#"<option value="정상">정상</option>"#));
        assert!(!html.contains("class=\"error\""));
    }

    #[test]
    fn test_fields_show_errors() {
        let form = ObservationForm {
            age: "<b>".to_string(),
            ..filled_form()
        };
        let errors = form.clean().unwrap_err();
        let html = observation_fields(&form, &errors);

        assert!(html.contains(r#"value="&lt;b&gt;""#));
        assert!(html.contains("정수를 입력하세요."));
    }
}
