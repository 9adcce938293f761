//! Bearer token extraction for protected routes.
use crate::error::AppError;
use crate::storage::DocumentStore;
use crate::AppState;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use blog_common::Pid;
use std::sync::Arc;

/// Pull the token out of an `Authorization: <scheme> <token>` header.
///
/// The scheme is not checked; only the two-part structure is.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AppError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AppError::MalformedAuthHeader)?;

    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if !scheme.is_empty() && !token.is_empty() => Ok(token),
        _ => Err(AppError::MalformedAuthHeader),
    }
}

/// Identity of the caller, resolved from a valid session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedPid(pub Pid);

impl<S> FromRequestParts<Arc<AppState<S>>> for AuthenticatedPid
where
    S: DocumentStore + 'static,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState<S>>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let pid = state.sessions.validate(token).await?;
        Ok(AuthenticatedPid(pid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_well_formed_header() {
        assert_eq!(bearer_token(&headers("Bearer abc")).unwrap(), "abc");
        // scheme name is not validated
        assert_eq!(bearer_token(&headers("Token abc")).unwrap(), "abc");
    }

    #[test]
    fn test_missing_header() {
        assert!(matches!(
            bearer_token(&HeaderMap::new()),
            Err(AppError::MissingAuthHeader)
        ));
    }

    #[test]
    fn test_malformed_headers() {
        for value in ["Bearer", "Bearer a b", "Bearer  abc", "Bearer ", " abc", ""] {
            assert!(
                matches!(bearer_token(&headers(value)), Err(AppError::MalformedAuthHeader)),
                "{value:?} should be malformed"
            );
        }
    }
}
