//! Request identity extraction.
//!
//! Two strategies produce the same [`Actor`]: an `Authorization: Bearer`
//! header, tried first, and the session cookie. A bearer header that fails
//! to resolve is rejected outright rather than falling back to the cookie.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Actor, BearerToken, Error};

use super::session::SessionContext;
use super::state::HttpState;

const BEARER_SCHEME: &str = "bearer";

/// Bearer token presented in the `Authorization` header, if any.
///
/// Other schemes are ignored so a cookie session can still apply.
pub fn bearer_token(req: &HttpRequest) -> Option<BearerToken> {
    let header = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return None;
    }
    BearerToken::from_presented(token)
}

/// Authenticated caller. Extraction fails with `401` when neither strategy
/// yields a live account.
#[derive(Debug, Clone, Copy)]
pub struct Identity(pub Actor);

impl Identity {
    pub fn actor(&self) -> &Actor {
        &self.0
    }
}

fn missing_state() -> Error {
    Error::internal("HTTP state is not registered")
}

impl FromRequest for Identity {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let bearer = bearer_token(req);
        let session = SessionContext::from_request(req, payload);
        Box::pin(async move {
            let state = state.ok_or_else(missing_state)?;
            if let Some(token) = bearer {
                return state.accounts.resolve_token(&token).await.map(Identity);
            }
            let session = session.await.map_err(Error::from)?;
            let user_id = session.require_user_id()?;
            state.accounts.resolve_session(&user_id).await.map(Identity)
        })
    }
}
