//! Connect JSON handlers for the `v1` services.
//!
//! Every route is a unary `POST /<Service>/<Method>` carrying a JSON message.
pub mod domains;
pub mod error;
pub mod health;
pub mod names;
pub mod records;
pub mod tokens;
pub mod types;

use crate::api::error::{ApiError, api_invalid_argument};
use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;

/// JSON request message. An empty body decodes as the message's zero value,
/// matching protobuf JSON semantics.
#[derive(Debug, Clone, Default)]
pub struct ConnectJson<T>(pub T);

impl<S, T> FromRequest<S> for ConnectJson<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(request, state)
            .await
            .map_err(|rejection| api_invalid_argument(rejection.body_text()))?;
        if bytes.is_empty() {
            return Ok(Self(T::default()));
        }
        serde_json::from_slice(&bytes)
            .map(Self)
            .map_err(|err| api_invalid_argument(format!("invalid request message: {err}")))
    }
}
