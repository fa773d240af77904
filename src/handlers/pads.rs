use axum::{
    Json,
    extract::{Path, Query, State},
    response::Redirect,
};
use serde::Serialize;
use tracing::info;

use crate::db::{Note, NoteOrder, Pad};
use crate::handlers::OrderQuery;
use crate::middleware::auth::CurrentUser;
use crate::middleware::form::LenientForm;
use crate::router::NotejamState;
use crate::types::forms::PadForm;
use crate::NotejamError;

#[derive(Debug, Serialize)]
pub struct PadNotesPage {
    pub pad: Pad,
    pub notes: Vec<Note>,
}

/// POST /pads/create/
pub async fn create_pad(
    State(state): State<NotejamState>,
    CurrentUser(user): CurrentUser,
    LenientForm(form): LenientForm<PadForm>,
) -> Result<Redirect, NotejamError> {
    let name = form
        .check()
        .map_err(|errors| NotejamError::invalid("pad", errors))?;
    let pad = state.storage.create_pad(user.id, &name).await?;
    info!(user_id = user.id, pad_id = pad.id, "pad created");
    Ok(Redirect::to("/"))
}

/// GET /pads/{pad_id}/ -> the pad and its notes.
pub async fn pad_notes(
    State(state): State<NotejamState>,
    CurrentUser(user): CurrentUser,
    Path(pad_id): Path<i64>,
    Query(query): Query<OrderQuery>,
) -> Result<Json<PadNotesPage>, NotejamError> {
    let pad = state
        .storage
        .pad_for_user(user.id, pad_id)
        .await?
        .ok_or(NotejamError::NotFound)?;
    let order = NoteOrder::parse(query.order.as_deref());
    let notes = state
        .storage
        .notes_for_user(user.id, Some(pad.id), order)
        .await?;
    Ok(Json(PadNotesPage { pad, notes }))
}

/// POST /pads/{pad_id}/edit/
pub async fn edit_pad(
    State(state): State<NotejamState>,
    CurrentUser(user): CurrentUser,
    Path(pad_id): Path<i64>,
    LenientForm(form): LenientForm<PadForm>,
) -> Result<Redirect, NotejamError> {
    let pad = state
        .storage
        .pad_for_user(user.id, pad_id)
        .await?
        .ok_or(NotejamError::NotFound)?;
    let name = form
        .check()
        .map_err(|errors| NotejamError::invalid("pad", errors))?;

    if !state.storage.rename_pad(user.id, pad.id, &name).await? {
        return Err(NotejamError::NotFound);
    }
    info!(user_id = user.id, pad_id = pad.id, "pad renamed");
    Ok(Redirect::to(&format!("/pads/{}/", pad.id)))
}

/// POST /pads/{pad_id}/delete/ -> removes the pad and every note in it.
pub async fn delete_pad(
    State(state): State<NotejamState>,
    CurrentUser(user): CurrentUser,
    Path(pad_id): Path<i64>,
) -> Result<Redirect, NotejamError> {
    if !state.storage.delete_pad(user.id, pad_id).await? {
        return Err(NotejamError::NotFound);
    }
    info!(user_id = user.id, pad_id, "pad deleted");
    Ok(Redirect::to("/"))
}
