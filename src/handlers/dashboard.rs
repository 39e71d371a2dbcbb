//! Dashboard handlers

use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Form,
};

use crate::{AppState, AppResult};
use crate::forms::{FormErrors, ObservationForm};
use crate::middleware::session::Visitor;
use crate::models::{ChildObservation, PredictionHistory};
use crate::views::{HomePage, Page};

/// Dashboard with an empty observation form
pub async fn home(
    State(state): State<AppState>,
    visitor: Visitor,
) -> AppResult<Page> {
    render(&state, &visitor, &ObservationForm::default(), &FormErrors::default()).await
}

/// Assess a submitted observation, store it with its probability and go back
/// to the dashboard
pub async fn submit(
    State(state): State<AppState>,
    visitor: Visitor,
    Form(form): Form<ObservationForm>,
) -> AppResult<Response> {
    let observation = match form.clean() {
        Ok(observation) => observation,
        Err(errors) => {
            tracing::debug!("Observation form rejected: {:?}", errors);
            return Ok(render(&state, &visitor, &form, &errors).await?.into_response());
        }
    };

    let assessment = state.model.assess(&observation);

    let mut tx = state.pool.begin().await?;
    let stored = ChildObservation::create(&mut *tx, &observation, assessment.is_danger).await?;
    PredictionHistory::create(
        &mut *tx,
        &stored.child_name,
        assessment.verdict(),
        Some(assessment.probability_pct),
    ).await?;
    tx.commit().await?;

    tracing::info!(
        "Observation {} stored: {} ({}%)",
        stored.id,
        assessment.verdict().as_str(),
        assessment.probability_pct
    );

    Ok(Redirect::to("/").into_response())
}

/// Clear every observation and prediction
pub async fn reset(
    State(state): State<AppState>,
    visitor: Visitor,
) -> AppResult<Redirect> {
    let mut tx = state.pool.begin().await?;
    let observations = ChildObservation::delete_all(&mut *tx).await?;
    let predictions = PredictionHistory::delete_all(&mut *tx).await?;
    tx.commit().await?;

    tracing::warn!(
        "Dashboard reset by {}: {} observations, {} predictions removed",
        visitor.user.as_ref().map(|u| u.username.as_str()).unwrap_or("anonymous"),
        observations,
        predictions
    );

    Ok(Redirect::to("/"))
}

async fn render(
    state: &AppState,
    visitor: &Visitor,
    form: &ObservationForm,
    errors: &FormErrors,
) -> AppResult<Page> {
    let observations = ChildObservation::list_recent(&state.pool).await?;
    let history = PredictionHistory::list(&state.pool).await?;
    let accuracy_label = state.model.accuracy_label();

    let page = HomePage {
        visitor,
        form,
        errors,
        observations: &observations,
        history: &history,
        reference: &state.reference,
        accuracy_label: &accuracy_label,
    };

    Ok(Page(page.render()))
}
