use axum::extract::rejection::FormRejection;
use axum::extract::{FromRequest, Request};
use axum::response::{IntoResponse, Response};
use axum::Form;
use serde::de::DeserializeOwned;
use tracing::debug;

/// URL-encoded form body. A request that carries no form content type (an
/// empty POST, typically) decodes to the form's default, so the handler
/// redisplays it with the usual `required` errors instead of failing with 415.
#[derive(Debug, Clone, Copy, Default)]
pub struct LenientForm<T>(pub T);

impl<T, S> FromRequest<S> for LenientForm<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Form::<T>::from_request(req, state).await {
            Ok(Form(value)) => Ok(Self(value)),
            Err(FormRejection::InvalidFormContentType(_)) => {
                debug!("request without form content type; treating as empty form");
                Ok(Self(T::default()))
            }
            Err(rejection) => Err(rejection.into_response()),
        }
    }
}
