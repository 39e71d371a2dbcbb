//! Single prediction handlers

use axum::{extract::State, Form};

use crate::{AppState, AppResult};
use crate::forms::{FormErrors, ObservationForm};
use crate::middleware::session::Visitor;
use crate::models::{ChildObservation, PredictionHistory};
use crate::views::{Page, PredictPage, PredictionOutcome};

pub async fn show(visitor: Visitor) -> Page {
    Page(
        PredictPage {
            visitor: &visitor,
            form: &ObservationForm::default(),
            errors: &FormErrors::default(),
            outcome: None,
        }
        .render(),
    )
}

/// Classify one observation, store it, and show the encoded input next to the
/// reference means
pub async fn submit(
    State(state): State<AppState>,
    visitor: Visitor,
    Form(form): Form<ObservationForm>,
) -> AppResult<Page> {
    let (errors, outcome) = match form.clean() {
        Ok(observation) => {
            let classification = state.model.classify(&observation);
            let verdict = classification.verdict();

            let mut tx = state.pool.begin().await?;
            let stored = ChildObservation::create(&mut *tx, &observation, classification.is_danger).await?;
            PredictionHistory::create(&mut *tx, &stored.child_name, verdict, None).await?;
            tx.commit().await?;

            tracing::info!("Prediction for observation {}: {}", stored.id, verdict.as_str());

            let outcome = PredictionOutcome::Predicted {
                result: format!("예측 결과: {}", verdict.as_str()),
                accuracy: state.model.accuracy_label(),
                input_values: classification.features,
                feature_means: state.reference.feature_means,
            };
            (FormErrors::default(), outcome)
        }
        Err(errors) => (errors, PredictionOutcome::Invalid),
    };

    Ok(Page(
        PredictPage {
            visitor: &visitor,
            form: &form,
            errors: &errors,
            outcome: Some(&outcome),
        }
        .render(),
    ))
}
