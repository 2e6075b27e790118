//! Session-cookie middleware for the authenticated scope.
//!
//! Opens the `userID` cookie, confirms the user still exists, and parks the
//! id in the request extensions for the
//! [`AuthenticatedUser`](crate::auth::AuthenticatedUser) extractor. Every
//! failure mode is a 401 with a JSON error body; handlers behind this
//! middleware never see an unauthenticated request.

use std::{pin::Pin, rc::Rc, sync::Arc};

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::StatusCode,
    web, Error, HttpMessage,
};
use futures::future::{ok, Future, Ready};
use log::debug;

use crate::{
    auth::{AuthenticatedUser, SessionKey, SESSION_COOKIE},
    data_objects::error_response,
};
use mart_engine::{MartApi, MartStore};

pub struct SessionFactory<B: MartStore> {
    api: web::Data<MartApi<B>>,
    key: Arc<SessionKey>,
}

impl<B: MartStore> SessionFactory<B> {
    pub fn new(api: web::Data<MartApi<B>>, key: Arc<SessionKey>) -> Self {
        Self { api, key }
    }
}

impl<S, Body, B> Transform<S, ServiceRequest> for SessionFactory<B>
where
    S: Service<ServiceRequest, Response = ServiceResponse<Body>, Error = Error> + 'static,
    S::Future: 'static,
    Body: 'static,
    B: MartStore,
{
    type Response = ServiceResponse<EitherBody<Body>>;
    type Error = Error;
    type Transform = SessionService<S, B>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(SessionService { api: self.api.clone(), key: Arc::clone(&self.key), service: Rc::new(service) })
    }
}

pub struct SessionService<S, B: MartStore> {
    api: web::Data<MartApi<B>>,
    key: Arc<SessionKey>,
    service: Rc<S>,
}

impl<S, Body, B> Service<ServiceRequest> for SessionService<S, B>
where
    S: Service<ServiceRequest, Response = ServiceResponse<Body>, Error = Error> + 'static,
    S::Future: 'static,
    Body: 'static,
    B: MartStore,
{
    type Response = ServiceResponse<EitherBody<Body>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let api = self.api.clone();
        let key = Arc::clone(&self.key);
        Box::pin(async move {
            let Some(cookie) = req.cookie(SESSION_COOKIE) else {
                return Ok(reject(req, "authentication required"));
            };
            let user_id = match key.open(cookie.value()) {
                Ok(id) => id,
                Err(e) => {
                    debug!("🔐️ Could not open session cookie: {e}");
                    return Ok(reject(req, "invalid authentication cookie"));
                },
            };
            match api.user_by_id(user_id).await {
                Ok(Some(_)) => {},
                Ok(None) | Err(_) => return Ok(reject(req, "user not found")),
            }
            req.extensions_mut().insert(AuthenticatedUser(user_id));
            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}

fn reject<Body>(req: ServiceRequest, message: &str) -> ServiceResponse<EitherBody<Body>> {
    req.into_response(error_response(StatusCode::UNAUTHORIZED, message)).map_into_right_body()
}
