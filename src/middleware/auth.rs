use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::{validate_jwt, Claims};
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated caller extracted from a bearer token
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub name: String,
    pub user_id: Uuid,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            name: claims.sub,
            user_id: claims.user_id,
        }
    }
}

/// JWT authentication middleware that validates tokens and extracts user context
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(request.headers()).map_err(ApiError::unauthorized)?;

    let claims = validate_jwt(token, &state.config.security.jwt_secret).map_err(|e| {
        tracing::debug!("Rejected bearer token: {}", e);
        ApiError::unauthorized(e.to_string())
    })?;

    let auth_user = AuthUser::from(claims);
    tracing::debug!("Authenticated {} ({})", auth_user.name, auth_user.user_id);
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, &'static str> {
    let auth_str = headers
        .get(header::AUTHORIZATION)
        .ok_or("Missing Authorization header")?
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    // Auth scheme names are case-insensitive
    let token = match auth_str.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => token.trim(),
        _ => return Err("Authorization header must use Bearer token format"),
    };

    if token.is_empty() {
        return Err("Empty JWT token");
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn with_auth(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(extract_bearer(&with_auth("Bearer abc.def.ghi")), Ok("abc.def.ghi"));
    }

    #[test]
    fn scheme_name_ignores_case() {
        assert_eq!(extract_bearer(&with_auth("bearer abc.def.ghi")), Ok("abc.def.ghi"));
        assert_eq!(extract_bearer(&with_auth("BEARER abc.def.ghi")), Ok("abc.def.ghi"));
        assert!(extract_bearer(&with_auth("Bearerabc.def.ghi")).is_err());
    }

    #[test]
    fn rejects_malformed_headers() {
        assert!(extract_bearer(&HeaderMap::new()).is_err());
        assert!(extract_bearer(&with_auth("Basic dXNlcjpwYXNz")).is_err());
        assert!(extract_bearer(&with_auth("Bearer   ")).is_err());
    }
}
