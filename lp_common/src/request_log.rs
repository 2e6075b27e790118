//! Request-log middleware.
//!
//! Emits one record per completed response with the method, URI, status code,
//! body size and elapsed milliseconds. The message is tagged by status class
//! so a `grep '❌'` over the rotated files surfaces server faults directly.

use std::{
    pin::Pin,
    rc::Rc,
    time::Instant,
};

use actix_web::{
    body::{BodySize, MessageBody},
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use futures::future::{ok, Future, Ready};
use log::info;

pub struct RequestLogFactory;

impl<S, B> Transform<S, ServiceRequest> for RequestLogFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RequestLogService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(RequestLogService { service: Rc::new(service) })
    }
}

pub struct RequestLogService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequestLogService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let method = req.method().to_string();
        let uri = req.uri().to_string();
        let started = Instant::now();
        Box::pin(async move {
            let res = service.call(req).await?;
            let status = res.status().as_u16();
            let size = match res.response().body().size() {
                BodySize::Sized(n) => n,
                _ => 0,
            };
            let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
            info!(
                "{} HTTP {method} {uri} status={status} size={size} duration_ms={elapsed_ms:.1}",
                status_emoji(status)
            );
            Ok(res)
        })
    }
}

fn status_emoji(status: u16) -> &'static str {
    match status {
        200..=299 => "✅",
        400..=499 => "⚠️",
        500..=599 => "❌",
        _ => "🔵",
    }
}
