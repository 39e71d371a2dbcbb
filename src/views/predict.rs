//! Single prediction page

use crate::forms::{FormErrors, ObservationForm};
use crate::inference::{format_decimal, FeatureVector, FEATURE_LAYOUT};
use crate::middleware::session::Visitor;
use super::{escape_html, form::observation_fields, layout};

/// Result block shown after a submission
pub enum PredictionOutcome {
    Predicted {
        result: String,
        accuracy: String,
        input_values: FeatureVector,
        feature_means: FeatureVector,
    },
    Invalid,
}

pub struct PredictPage<'a> {
    pub visitor: &'a Visitor,
    pub form: &'a ObservationForm,
    pub errors: &'a FormErrors,
    pub outcome: Option<&'a PredictionOutcome>,
}

impl<'a> PredictPage<'a> {
    pub fn render(&self) -> String {
        let content = format!(
            r#"<section class="card">
                <h2>단건 위험 예측</h2>
                <form method="post" action="/predict">
                    <div class="grid">{fields}</div>
                    <p><button type="submit">예측</button></p>
                </form>
            </section>
            {outcome}"#,
            fields = observation_fields(self.form, self.errors),
            outcome = self.render_outcome(),
        );

        layout("단건 예측", self.visitor, &content)
    }

    fn render_outcome(&self) -> String {
        match self.outcome {
            None => String::new(),
            Some(PredictionOutcome::Invalid) => {
                r#"<section class="card"><p class="flash error">❌ 유효하지 않은 입력입니다.</p></section>"#.to_string()
            }
            Some(PredictionOutcome::Predicted { result, accuracy, input_values, feature_means }) => {
                let rows: String = FEATURE_LAYOUT
                    .iter()
                    .zip(input_values.iter().zip(feature_means.iter()))
                    .map(|(name, (input, mean))| {
                        format!(
                            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                            name,
                            format_decimal(*input),
                            format_decimal(*mean)
                        )
                    })
                    .collect();

                format!(
                    r#"<section class="card">
                        <h2>{result}</h2>
                        <p class="muted">{accuracy}</p>
                        <table>
                            <thead><tr><th>항목</th><th>입력값</th><th>전체 평균</th></tr></thead>
                            <tbody>{rows}</tbody>
                        </table>
                    </section>"#,
                    result = escape_html(result),
                    accuracy = escape_html(accuracy),
                    rows = rows,
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_prediction_table() {
        let outcome = PredictionOutcome::Predicted {
            result: "예측 결과: 위험".to_string(),
            accuracy: "정확도: 87.34%".to_string(),
            input_values: [5.0, 1.0, 2.0, 2.0, 2.0, 3.0, 1.0, 0.0, 2.0],
            feature_means: [4.67, 0.5, 0.8, 1.0, 0.9, 1.2, 1.1, 1.0, 0.7],
        };
        let html = PredictPage {
            visitor: &Visitor::default(),
            form: &ObservationForm::default(),
            errors: &FormErrors::default(),
            outcome: Some(&outcome),
        }
        .render();

        assert!(html.contains("<h2>예측 결과: 위험</h2>"));
        assert!(html.contains("정확도: 87.34%"));
        assert!(html.contains("<tr><td>나이</td><td>5.0</td><td>4.67</td></tr>"));
        assert!(html.contains("<tr><td>보호자정서상태</td><td>2.0</td><td>0.7</td></tr>"));
    }

    #[test]
    fn test_render_invalid_and_blank() {
        let invalid = PredictPage {
            visitor: &Visitor::default(),
            form: &ObservationForm::default(),
            errors: &FormErrors::default(),
            outcome: Some(&PredictionOutcome::Invalid),
        }
        .render();
        assert!(invalid.contains("❌ 유효하지 않은 입력입니다."));

        let blank = PredictPage {
            visitor: &Visitor::default(),
            form: &ObservationForm::default(),
            errors: &FormErrors::default(),
            outcome: None,
        }
        .render();
        assert!(!blank.contains("입력값"));
    }
}
