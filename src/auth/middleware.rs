use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderMap, AUTHORIZATION},
    Error, HttpMessage, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use log::debug;
use std::sync::Arc;

use crate::auth::{AuthenticatedUser, Authenticator};
use crate::error::{AppError, AuthHeaderError};

/// Rejects requests without a valid `Authorization: Bearer <token>` header.
///
/// On success the resolved [`AuthenticatedUser`] is inserted into the request
/// extensions before the inner service runs. On failure the inner service is
/// never called and the client gets a 401 `{"status": "<reason>"}` response.
#[derive(Clone)]
pub struct IdentityMiddleware {
    auth: Arc<dyn Authenticator>,
}

impl IdentityMiddleware {
    pub fn new(auth: Arc<dyn Authenticator>) -> Self {
        Self { auth }
    }
}

impl<S, B> Transform<S, ServiceRequest> for IdentityMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = IdentityMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(IdentityMiddlewareService {
            service,
            auth: Arc::clone(&self.auth),
        }))
    }
}

pub struct IdentityMiddlewareService<S> {
    service: S,
    auth: Arc<dyn Authenticator>,
}

impl<S, B> Service<ServiceRequest> for IdentityMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let identity = identify(req.headers(), self.auth.as_ref());
        match identity {
            Ok(user) => {
                req.extensions_mut().insert(user);
                let fut = self.service.call(req);
                Box::pin(async move { Ok(fut.await?.map_into_left_body()) })
            }
            Err(err) => {
                debug!("rejecting {} {}: {}", req.method(), req.path(), err);
                let response = AppError::from(err).error_response();
                let res = req.into_response(response).map_into_right_body();
                Box::pin(async move { Ok(res) })
            }
        }
    }
}

/// Runs the header checks in order; the first failure wins.
pub fn identify(
    headers: &HeaderMap,
    auth: &dyn Authenticator,
) -> Result<AuthenticatedUser, AuthHeaderError> {
    let token = bearer_token(headers)?;
    auth.verify(token)
        .map(AuthenticatedUser)
        .map_err(|e| AuthHeaderError::InvalidToken(e.message().to_owned()))
}

/// Extracts `<token>` from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthHeaderError> {
    let value = match headers.get(AUTHORIZATION) {
        None => return Err(AuthHeaderError::Missing),
        Some(value) if value.is_empty() => return Err(AuthHeaderError::Missing),
        Some(value) => value.to_str().map_err(|_| AuthHeaderError::Malformed)?,
    };

    let parts: Vec<&str> = value.split(' ').collect();
    let token = match parts.as_slice() {
        ["Bearer", token] => *token,
        _ => return Err(AuthHeaderError::Malformed),
    };

    if token.is_empty() {
        return Err(AuthHeaderError::EmptyToken);
    }
    Ok(token)
}
