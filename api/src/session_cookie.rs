use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::SET_COOKIE, request::Parts, HeaderValue},
    response::Response,
};
use axum_extra::TypedHeader;
use headers::Cookie;
use std::convert::Infallible;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "pdf_qa_session";

/// Session id carried by the request cookie, if any and well-formed.
pub struct SessionCookie(pub Option<Uuid>);

#[async_trait]
impl<S> FromRequestParts<S> for SessionCookie
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let id = TypedHeader::<Cookie>::from_request_parts(parts, state)
            .await
            .ok()
            .and_then(|TypedHeader(cookie)| {
                cookie
                    .get(SESSION_COOKIE)
                    .and_then(|value| Uuid::parse_str(value).ok())
            });

        Ok(SessionCookie(id))
    }
}

/// Adds the session cookie to a response for a newly created session.
pub fn attach(mut response: Response, id: Uuid, created: bool) -> Response {
    if !created {
        return response;
    }

    let cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id);
    match HeaderValue::from_str(&cookie) {
        Ok(value) => {
            response.headers_mut().append(SET_COOKIE, value);
        }
        Err(e) => log::error!("Could not encode session cookie: {}", e),
    }
    response
}
