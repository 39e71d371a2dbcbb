//! CSV bulk upload handlers

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};

use crate::{AppState, AppResult};
use crate::dataset::bulk::parse_upload;
use crate::middleware::session::Visitor;
use crate::models::ChildObservation;
use crate::views::{pages, Page};

/// Multipart field carrying the CSV file
const FILE_FIELD: &str = "csv_file";

pub async fn show(visitor: Visitor) -> Page {
    Page(pages::bulk_upload(&visitor, None))
}

/// Store every row of an uploaded CSV, or none of them
pub async fn submit(
    State(state): State<AppState>,
    visitor: Visitor,
    mut multipart: Multipart,
) -> AppResult<Response> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(FILE_FIELD) {
            upload = Some(field.bytes().await?);
            break;
        }
    }

    let Some(bytes) = upload.filter(|b| !b.is_empty()) else {
        return Ok(Page(pages::bulk_upload(&visitor, None)).into_response());
    };

    let rows = match parse_upload(&bytes) {
        Ok(rows) => rows,
        Err(e) => {
            tracing::warn!("Rejected CSV upload: {}", e);
            let page = pages::bulk_upload(&visitor, Some(&e.to_string()));
            return Ok((StatusCode::BAD_REQUEST, Page(page)).into_response());
        }
    };

    let mut tx = state.pool.begin().await?;
    for row in &rows {
        ChildObservation::create(&mut *tx, &row.observation, row.is_danger).await?;
    }
    tx.commit().await?;

    tracing::info!("Bulk upload stored {} observations", rows.len());

    Ok(Redirect::to("/").into_response())
}
