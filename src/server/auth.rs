use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use secrecy::{ExposeSecret, SecretString};
use tracing::warn;

use crate::config::BasicCredentials;

/// Gate applied to every route.
#[derive(Clone, Debug)]
pub enum AuthPolicy {
    AllowAll,
    Basic { user: String, password: SecretString },
}

impl AuthPolicy {
    pub fn from_credentials(credentials: Option<&BasicCredentials>) -> Self {
        credentials.map_or(Self::AllowAll, |creds| Self::Basic {
            user: creds.user.clone(),
            password: creds.password.clone(),
        })
    }

    pub fn permits(&self, headers: &HeaderMap) -> bool {
        match self {
            Self::AllowAll => true,
            Self::Basic { user, password } => basic_credentials(headers)
                .is_some_and(|(u, p)| u == *user && p == password.expose_secret()),
        }
    }
}

fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, password) = decoded.split_once(':')?;
    Some((user.to_string(), password.to_string()))
}

pub(super) async fn require_auth(
    State(policy): State<Arc<AuthPolicy>>,
    request: Request,
    next: Next,
) -> Response {
    if policy.permits(request.headers()) {
        return next.run(request).await;
    }
    warn!(path = %request.uri().path(), "rejected unauthenticated request");
    let mut response = StatusCode::UNAUTHORIZED.into_response();
    response.headers_mut().insert(
        WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"genie-datasource\""),
    );
    response
}
