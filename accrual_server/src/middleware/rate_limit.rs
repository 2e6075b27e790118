//! Per-remote-address rate limiting for the status endpoint.
//!
//! A fixed window over one shared counter map: when the window has elapsed,
//! every counter resets at once. The check and the increment happen under a
//! single lock hold, so two requests from the same address cannot both sneak
//! under the limit. Keys are raw peer addresses; behavior behind a proxy is
//! the operator's concern.

use std::{
    collections::HashMap,
    pin::Pin,
    rc::Rc,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpResponse,
};
use futures::future::{ok, Future, Ready};
use log::warn;

pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    state: Mutex<WindowState>,
}

struct WindowState {
    requests: HashMap<String, u32>,
    last_reset: Instant,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            state: Mutex::new(WindowState { requests: HashMap::new(), last_reset: Instant::now() }),
        }
    }

    pub fn allow(&self, addr: &str) -> bool {
        self.allow_at(addr, Instant::now())
    }

    fn allow_at(&self, addr: &str, now: Instant) -> bool {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if now.duration_since(state.last_reset) > self.window {
            state.requests.clear();
            state.last_reset = now;
        }
        let count = state.requests.entry(addr.to_string()).or_insert(0);
        if *count >= self.max_requests {
            return false;
        }
        *count += 1;
        true
    }
}

pub struct RateLimitFactory {
    limiter: Arc<RateLimiter>,
}

impl RateLimitFactory {
    pub fn new(limiter: Arc<RateLimiter>) -> Self {
        Self { limiter }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimitFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimitService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(RateLimitService { limiter: Arc::clone(&self.limiter), service: Rc::new(service) })
    }
}

pub struct RateLimitService<S> {
    limiter: Arc<RateLimiter>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RateLimitService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let addr = req.connection_info().peer_addr().unwrap_or("unknown").to_string();
        if !self.limiter.allow(&addr) {
            warn!("🚦️ Rate limit exceeded for {addr}");
            let res = req.into_response(HttpResponse::TooManyRequests().body("Too many requests"));
            return Box::pin(ok(res.map_into_right_body()));
        }
        let fut = self.service.call(req);
        Box::pin(async move {
            let res = fut.await?;
            Ok(res.map_into_left_body())
        })
    }
}
