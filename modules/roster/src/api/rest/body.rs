use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use modkit::ProblemResponse;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::api::rest::error::map_domain_error;
use crate::domain::error::DomainError;

/// `Json<T>` whose rejection is a `ROSTER_VALIDATION` problem document.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

/// Field named by a "missing field `x`" deserialization error, if any.
fn missing_field(message: &str) -> Option<&str> {
    let (_, rest) = message.split_once("missing field `")?;
    let (field, _) = rest.split_once('`')?;
    Some(field)
}

fn invalid_body(rejection: &JsonRejection) -> DomainError {
    let message = rejection.body_text();
    let field = missing_field(&message).unwrap_or_default().to_string();
    DomainError::validation(field, message)
}

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let path = req.uri().path().to_owned();
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => {
                debug!(error = %rejection.body_text(), "request body rejected");
                Err(map_domain_error(&invalid_body(&rejection), &path))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_is_extracted() {
        assert_eq!(
            missing_field("Failed to deserialize the JSON body into the target type: missing field `lastName` at line 1 column 20"),
            Some("lastName")
        );
        assert_eq!(missing_field("expected value at line 1 column 1"), None);
    }
}
