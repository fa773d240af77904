use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect},
};
use axum_extra::extract::cookie::PrivateCookieJar;
use serde::Deserialize;
use tracing::{info, warn};

use crate::middleware::auth::{CurrentUser, SIGNIN_PATH, end_session, safe_next, start_session};
use crate::middleware::form::LenientForm;
use crate::router::NotejamState;
use crate::service::password::{hash_password_blocking, verify_password_blocking};
use crate::types::forms::{FormErrors, SettingsForm, SigninForm, SignupForm};
use crate::NotejamError;

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// POST /signup/ -> creates the account and sends the user to sign in.
pub async fn signup(
    State(state): State<NotejamState>,
    LenientForm(form): LenientForm<SignupForm>,
) -> Result<Redirect, NotejamError> {
    let data = form
        .check()
        .map_err(|errors| NotejamError::invalid("signup", errors))?;

    let taken = || {
        NotejamError::invalid(
            "signup",
            FormErrors::single("email", "User with this email already exists."),
        )
    };

    if state.storage.user_by_email(&data.email).await?.is_some() {
        return Err(taken());
    }

    let hash = hash_password_blocking(data.password).await?;
    // A concurrent signup can still win the race between lookup and insert.
    let Some(user) = state.storage.create_user(&data.email, &hash).await? else {
        return Err(taken());
    };

    info!(user_id = user.id, "user signed up");
    Ok(Redirect::to(SIGNIN_PATH))
}

/// POST /signin/ -> establishes the session cookie.
pub async fn signin(
    State(state): State<NotejamState>,
    Query(query): Query<NextQuery>,
    jar: PrivateCookieJar,
    LenientForm(form): LenientForm<SigninForm>,
) -> Result<impl IntoResponse, NotejamError> {
    let (email, password) = form
        .check()
        .map_err(|errors| NotejamError::invalid("signin", errors))?;

    let Some(user) = state.storage.user_by_email(&email).await? else {
        warn!("sign-in attempt for unknown email");
        return Err(NotejamError::wrong_credentials());
    };

    if !verify_password_blocking(password, user.password_hash.clone()).await? {
        warn!(user_id = user.id, "sign-in attempt with wrong password");
        return Err(NotejamError::wrong_credentials());
    }

    let jar = start_session(jar, user.id, &state);
    let target = safe_next(query.next.as_deref()).unwrap_or("/").to_string();

    info!(user_id = user.id, "user signed in");
    Ok((jar, Redirect::to(&target)))
}

/// GET|POST /signout/
pub async fn signout(CurrentUser(user): CurrentUser, jar: PrivateCookieJar) -> impl IntoResponse {
    info!(user_id = user.id, "user signed out");
    (end_session(jar), Redirect::to(SIGNIN_PATH))
}

/// POST /settings/ -> changes the signed-in user's password.
pub async fn settings(
    State(state): State<NotejamState>,
    CurrentUser(user): CurrentUser,
    LenientForm(form): LenientForm<SettingsForm>,
) -> Result<Redirect, NotejamError> {
    let (current, new) = form
        .check()
        .map_err(|errors| NotejamError::invalid("settings", errors))?;

    if !verify_password_blocking(current, user.password_hash.clone()).await? {
        return Err(NotejamError::invalid(
            "settings",
            FormErrors::single("current_password", "Wrong current password."),
        ));
    }

    let hash = hash_password_blocking(new).await?;
    state.storage.set_password_hash(user.id, &hash).await?;

    info!(user_id = user.id, "password changed");
    Ok(Redirect::to("/"))
}
