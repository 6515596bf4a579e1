//! Bearer-session authentication.
//!
//! Resolves `Authorization: Bearer <token>` to the caller's store and hands it
//! to handlers through request extensions.

pub mod password;

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::errors::AppError;
use crate::store::SharedStore;
use crate::AppState;

/// The authenticated caller, inserted by `session_auth_layer`.
#[derive(Clone)]
pub struct SessionContext {
    pub token: String,
    pub store: SharedStore,
}

/// Extract the token from an `Authorization: Bearer` header value.
pub fn bearer_token(value: &str) -> Option<&str> {
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

/// Reject requests without a live session; attach the session otherwise.
pub async fn session_auth_layer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token)
        .map(|s| s.to_string());

    let Some(token) = token else {
        return AppError::Unauthorized("Missing bearer token".to_string()).into_response();
    };

    match state.sessions.resolve(&token).await {
        Ok(store) => {
            request
                .extensions_mut()
                .insert(SessionContext { token, store });
            next.run(request).await
        }
        Err(err) => err.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc-123"), Some("abc-123"));
        assert_eq!(bearer_token("Bearer   "), None);
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("abc-123"), None);
    }
}
