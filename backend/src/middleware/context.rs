//! Request context extractor
//!
//! Reads the optional caller identity headers. Neither is authenticated; the
//! actor id only labels history rows and the session id scopes alert
//! acknowledgements.

use axum::http::request::Parts;

pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const SESSION_ID_HEADER: &str = "x-session-id";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub actor_id: Option<String>,
    pub session_id: Option<String>,
}

impl RequestContext {
    pub fn actor(&self) -> Option<&str> {
        self.actor_id.as_deref()
    }

    pub fn session(&self) -> Option<&str> {
        self.session_id.as_deref()
    }
}

fn header_value(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(RequestContext {
            actor_id: header_value(parts, ACTOR_ID_HEADER),
            session_id: header_value(parts, SESSION_ID_HEADER),
        })
    }
}
