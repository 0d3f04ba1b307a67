/// Extractors that reject malformed input as validation errors (422)
use crate::error::ServerError;
use axum::{
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;
use vibesia_core::VibesiaError;

/// JSON body that is deserialized and then validated
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| VibesiaError::invalid("body", rejection.body_text()))?;
        value.validate().map_err(VibesiaError::from)?;
        Ok(Self(value))
    }
}

/// Query string that is deserialized and then validated
#[derive(Debug, Clone)]
pub struct ValidatedQuery<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| VibesiaError::invalid("query", rejection.body_text()))?;
        value.validate().map_err(VibesiaError::from)?;
        Ok(Self(value))
    }
}
