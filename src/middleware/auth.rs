use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, Key, PrivateCookieJar, SameSite};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use tracing::debug;

use crate::db::User;
use crate::router::NotejamState;

pub const SESSION_COOKIE: &str = "notejam_session";
pub const SIGNIN_PATH: &str = "/signin/";

/// Characters left as-is in the `next` value: unreserved ones plus `/`.
const NEXT_PARAM: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// The signed-in user. Handlers taking this extractor are only reachable
/// with a valid session; anyone else is sent to the sign-in page with a
/// `next` parameter pointing back at the requested URL.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<NotejamState> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &NotejamState,
    ) -> Result<Self, Self::Rejection> {
        let jar = match PrivateCookieJar::<Key>::from_request_parts(parts, state).await {
            Ok(jar) => jar,
            Err(never) => match never {},
        };

        let user_id = jar
            .get(SESSION_COOKIE)
            .and_then(|c| c.value().parse::<i64>().ok());

        if let Some(user_id) = user_id {
            match state.storage.user_by_id(user_id).await {
                Ok(Some(user)) => return Ok(Self(user)),
                Ok(None) => debug!(user_id, "session refers to a missing user"),
                Err(e) => return Err(e.into_response()),
            }
        }

        let original = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        Err(Redirect::to(&signin_redirect(original)).into_response())
    }
}

/// `/signin/?next=<percent-encoded target>`; path separators stay readable.
pub fn signin_redirect(next: &str) -> String {
    format!("{SIGNIN_PATH}?next={}", utf8_percent_encode(next, NEXT_PARAM))
}

/// Only local absolute paths are honoured as post-signin targets.
pub fn safe_next(next: Option<&str>) -> Option<&str> {
    next.filter(|n| n.starts_with('/') && !n.starts_with("//") && !n.contains('\\'))
}

pub fn start_session(
    jar: PrivateCookieJar,
    user_id: i64,
    state: &NotejamState,
) -> PrivateCookieJar {
    let cookie = Cookie::build(Cookie::new(SESSION_COOKIE, user_id.to_string()))
        .path("/")
        .http_only(true)
        .secure(!state.insecure_cookie)
        .same_site(SameSite::Lax)
        .max_age(state.session_ttl)
        .build();
    jar.add(cookie)
}

pub fn end_session(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/").build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signin_redirect_keeps_slashes() {
        assert_eq!(signin_redirect("/pads/create/"), "/signin/?next=/pads/create/");
    }

    #[test]
    fn signin_redirect_encodes_query_characters() {
        assert_eq!(
            signin_redirect("/?order=-name&x=a b"),
            "/signin/?next=/%3Forder%3D-name%26x%3Da%20b"
        );
    }

    #[test]
    fn safe_next_rejects_foreign_targets() {
        assert_eq!(safe_next(Some("/pads/1/")), Some("/pads/1/"));
        assert_eq!(safe_next(Some("//evil.example")), None);
        assert_eq!(safe_next(Some("https://evil.example")), None);
        assert_eq!(safe_next(None), None);
    }
}
