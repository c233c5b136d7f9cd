//! Authentication gate for protected routes and the role gate layered after it.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::handlers::http::AppState;

const BEARER_SCHEME: &str = "Bearer";

/// Identity taken from a verified token. Lives in the request's extensions
/// for that request only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
    pub email: String,
    pub role: String,
}

/// Pull the token out of `Authorization: Bearer <token>`.
///
/// The header must be exactly two space-separated parts, the first being
/// the literal `Bearer`.
pub fn bearer_token(headers: &HeaderMap) -> AppResult<&str> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthenticated("missing authentication token".to_string()))?
        .to_str()
        .map_err(|_| AppError::Unauthenticated("invalid authorization header".to_string()))?;

    let parts: Vec<&str> = value.split(' ').collect();
    match parts.as_slice() {
        [BEARER_SCHEME, token] => Ok(*token),
        _ => Err(AppError::Unauthenticated(
            "invalid authorization header format (use: Bearer <token>)".to_string(),
        )),
    }
}

fn authenticate(headers: &HeaderMap, state: &AppState) -> AppResult<Identity> {
    let token = bearer_token(headers)?;
    let claims = state.tokens().verify(token).map_err(|e| {
        debug!(error = %e, "rejected bearer token");
        AppError::Unauthenticated("invalid or expired token".to_string())
    })?;
    let user_id = claims
        .user_id()
        .map_err(|_| AppError::Unauthenticated("invalid or expired token".to_string()))?;
    Ok(Identity {
        user_id,
        email: claims.email,
        role: claims.role,
    })
}

/// Middleware: reject the request unless it carries a valid bearer token,
/// otherwise attach the caller's [`Identity`] and continue.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = authenticate(request.headers(), &state)?;
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Role a route group demands; state for [`require_role`].
#[derive(Debug, Clone)]
pub struct RequiredRole(pub &'static str);

/// Middleware: 403 unless the authenticated caller holds the required role.
/// Mount inside [`require_auth`].
pub async fn require_role(
    State(RequiredRole(role)): State<RequiredRole>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = request
        .extensions()
        .get::<Identity>()
        .ok_or_else(|| AppError::Unauthenticated("missing authentication token".to_string()))?;
    if identity.role != role {
        debug!(user_id = identity.user_id, required = role, "role check failed");
        return Err(AppError::Forbidden);
    }
    Ok(next.run(request).await)
}

/// Extractor: the authenticated caller. Uses the identity the gate stored,
/// or authenticates the request itself when mounted without the gate.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(identity) = parts.extensions.get::<Identity>() {
            return Ok(CurrentUser(identity.clone()));
        }
        let identity = authenticate(&parts.headers, state)?;
        Ok(CurrentUser(identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn missing_header_is_unauthenticated() {
        let err = bearer_token(&HeaderMap::new()).unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated(_)));
    }

    #[test]
    fn malformed_schemes_are_rejected() {
        for value in [
            "Basic dXNlcjpwYXNz",
            "bearer abc",
            "Bearer",
            "Bearer a b",
            "Bearer  abc",
            "abc",
        ] {
            assert!(
                matches!(bearer_token(&headers(value)), Err(AppError::Unauthenticated(_))),
                "{value:?} should be rejected"
            );
        }
    }
}
