// ============================
// crates/backend-lib/src/handlers/body.rs
// ============================
//! JSON request bodies that fail as [`AppError`].
use crate::error::AppError;
use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

/// JSON body extractor.
///
/// An absent or blank body reads as `T::default()`, so a request without
/// one reaches the required-field checks and fails there. The content type
/// is not inspected.
#[derive(Debug, Clone, Default)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned + Default + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| AppError::InvalidBody(rejection.body_text()))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(T::default()));
        }

        let Json(value) = Json::<T>::from_bytes(&bytes)?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use blog_common::Credentials;

    async fn extract(body: &'static str) -> Result<Credentials, AppError> {
        let request = axum::http::Request::builder()
            .body(Body::from(body))
            .unwrap();
        <JsonBody<Credentials> as FromRequest<()>>::from_request(request, &())
            .await
            .map(|JsonBody(creds)| creds)
    }

    #[tokio::test]
    async fn test_blank_body_reads_as_default() {
        for body in ["", "  \n"] {
            let creds = extract(body).await.unwrap();
            assert!(creds.email.is_none());
            assert!(creds.password.is_none());
        }
    }

    #[tokio::test]
    async fn test_json_without_content_type_is_parsed() {
        let creds = extract(r#"{"email":"a@x.com"}"#).await.unwrap();
        assert_eq!(creds.email.as_deref(), Some("a@x.com"));
    }

    #[tokio::test]
    async fn test_malformed_json_is_invalid_body() {
        let err = extract("{").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidBody(_)));

        let err = extract(r#"{"email": 5}"#).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidBody(_)));
    }
}
