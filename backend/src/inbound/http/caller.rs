//! Caller identity extraction for callable endpoints.
//!
//! A request without an `Authorization` header has no caller; whether that
//! is acceptable is up to the use-case. A header that is present must carry a
//! bearer token the identity provider accepts.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{CallerIdentity, Error};
use crate::inbound::http::state::HttpState;

const BEARER_PREFIX: &str = "Bearer ";

/// Caller attached to the current request, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext(Option<CallerIdentity>);

impl CallerContext {
    /// Identity, if the request carried a verified token.
    #[must_use]
    pub fn identity(&self) -> Option<&CallerIdentity> {
        self.0.as_ref()
    }

    /// Take the identity out.
    #[must_use]
    pub fn into_identity(self) -> Option<CallerIdentity> {
        self.0
    }
}

fn bearer_token(req: &HttpRequest) -> Result<Option<String>, Error> {
    let Some(header) = req.headers().get(AUTHORIZATION) else {
        return Ok(None);
    };
    let token = header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            Error::unauthenticated("Authorization header must carry a bearer token.")
        })?;
    Ok(Some(token.to_owned()))
}

impl FromRequest for CallerContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = bearer_token(req);
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        Box::pin(async move {
            let Some(token) = token? else {
                return Ok(Self(None));
            };
            let state =
                state.ok_or_else(|| Error::internal("HTTP state is not registered"))?;
            match state.identity.verify(&token).await {
                Ok(Some(identity)) => Ok(Self(Some(identity))),
                Ok(None) => Err(Error::unauthenticated("Identity token was rejected.").into()),
                Err(err) => {
                    warn!(error = %err, "identity provider unavailable");
                    Err(Error::unavailable("Identity provider is unavailable.").into())
                }
            }
        })
    }
}
