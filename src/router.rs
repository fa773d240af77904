use axum::{
    Router,
    extract::FromRef,
    routing::{get, post},
};
use axum_extra::extract::cookie::Key;
use time::Duration;

use crate::db::Storage;
use crate::handlers::{auth, notes, pads};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct NotejamState {
    pub storage: Storage,
    key: Key,
    pub insecure_cookie: bool,
    pub session_ttl: Duration,
}

impl NotejamState {
    pub fn new(storage: Storage, key: Key, insecure_cookie: bool, session_ttl: Duration) -> Self {
        Self {
            storage,
            key,
            insecure_cookie,
            session_ttl,
        }
    }
}

impl FromRef<NotejamState> for Key {
    fn from_ref(state: &NotejamState) -> Self {
        state.key.clone()
    }
}

pub fn notejam_router(state: NotejamState) -> Router {
    Router::new()
        .route("/", get(notes::home))
        .route("/signup/", post(auth::signup))
        .route("/signin/", post(auth::signin))
        .route("/signout/", get(auth::signout).post(auth::signout))
        .route("/settings/", post(auth::settings))
        .route("/pads/create/", post(pads::create_pad))
        .route("/pads/{pad_id}/", get(pads::pad_notes))
        .route("/pads/{pad_id}/edit/", post(pads::edit_pad))
        .route("/pads/{pad_id}/delete/", post(pads::delete_pad))
        .route("/notes/create/", post(notes::create_note))
        .route("/notes/{note_id}/", get(notes::view_note))
        .route("/notes/{note_id}/edit/", post(notes::edit_note))
        .route("/notes/{note_id}/delete/", post(notes::delete_note))
        .with_state(state)
}
