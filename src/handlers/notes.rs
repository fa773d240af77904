use axum::{
    Json,
    extract::{Path, Query, State},
    response::Redirect,
};
use serde::Serialize;
use tracing::info;

use crate::db::{Note, NoteOrder, Pad, Storage};
use crate::handlers::OrderQuery;
use crate::middleware::auth::CurrentUser;
use crate::middleware::form::LenientForm;
use crate::router::NotejamState;
use crate::types::forms::NoteForm;
use crate::NotejamError;

#[derive(Debug, Serialize)]
pub struct HomePage {
    pub pads: Vec<Pad>,
    pub notes: Vec<Note>,
}

/// Resolve the pad a note form points at. Pads owned by someone else are
/// indistinguishable from missing ones.
async fn owned_pad(storage: &Storage, owner: i64, pad_id: i64) -> Result<Pad, NotejamError> {
    storage
        .pad_for_user(owner, pad_id)
        .await?
        .ok_or(NotejamError::NotFound)
}

/// GET / -> the user's pads and all of their notes.
pub async fn home(
    State(state): State<NotejamState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<OrderQuery>,
) -> Result<Json<HomePage>, NotejamError> {
    let order = NoteOrder::parse(query.order.as_deref());
    let pads = state.storage.pads_for_user(user.id).await?;
    let notes = state.storage.notes_for_user(user.id, None, order).await?;
    Ok(Json(HomePage { pads, notes }))
}

/// POST /notes/create/
pub async fn create_note(
    State(state): State<NotejamState>,
    CurrentUser(user): CurrentUser,
    LenientForm(form): LenientForm<NoteForm>,
) -> Result<Redirect, NotejamError> {
    let data = form
        .check()
        .map_err(|errors| NotejamError::invalid("note", errors))?;
    let pad = owned_pad(&state.storage, user.id, data.pad).await?;

    let note = state
        .storage
        .create_note(user.id, pad.id, &data.name, &data.text)
        .await?;
    info!(user_id = user.id, pad_id = pad.id, note_id = note.id, "note created");
    Ok(Redirect::to("/"))
}

/// GET /notes/{note_id}/
pub async fn view_note(
    State(state): State<NotejamState>,
    CurrentUser(user): CurrentUser,
    Path(note_id): Path<i64>,
) -> Result<Json<Note>, NotejamError> {
    let note = state
        .storage
        .note_for_user(user.id, note_id)
        .await?
        .ok_or(NotejamError::NotFound)?;
    Ok(Json(note))
}

/// POST /notes/{note_id}/edit/
///
/// A `pad` of `0` leaves the note in its current pad.
pub async fn edit_note(
    State(state): State<NotejamState>,
    CurrentUser(user): CurrentUser,
    Path(note_id): Path<i64>,
    LenientForm(form): LenientForm<NoteForm>,
) -> Result<Redirect, NotejamError> {
    let note = state
        .storage
        .note_for_user(user.id, note_id)
        .await?
        .ok_or(NotejamError::NotFound)?;
    let data = form
        .check()
        .map_err(|errors| NotejamError::invalid("note", errors))?;

    let pad_id = match data.pad {
        0 => note.pad_id,
        requested => owned_pad(&state.storage, user.id, requested).await?.id,
    };

    if !state
        .storage
        .update_note(user.id, note.id, pad_id, &data.name, &data.text)
        .await?
    {
        return Err(NotejamError::NotFound);
    }
    info!(user_id = user.id, note_id = note.id, pad_id, "note updated");
    Ok(Redirect::to("/"))
}

/// POST /notes/{note_id}/delete/
pub async fn delete_note(
    State(state): State<NotejamState>,
    CurrentUser(user): CurrentUser,
    Path(note_id): Path<i64>,
) -> Result<Redirect, NotejamError> {
    if !state.storage.delete_note(user.id, note_id).await? {
        return Err(NotejamError::NotFound);
    }
    info!(user_id = user.id, note_id, "note deleted");
    Ok(Redirect::to("/"))
}
