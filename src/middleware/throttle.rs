use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use governor::{
    clock::{Clock, DefaultClock},
    middleware::NoOpMiddleware,
    state::keyed::DefaultKeyedStateStore,
    Quota, RateLimiter,
};
use std::net::{IpAddr, Ipv4Addr};
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::ApiError;

/// Idle client keys are dropped every this many checks.
const PRUNE_EVERY: u64 = 1024;

type KeyedLimiter<C> =
    RateLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, C, NoOpMiddleware<<C as Clock>::Instant>>;

/// Per-minute request quota per client address, enforced with governor's
/// keyed GCRA limiter. A limit of 0 disables throttling.
#[derive(Clone)]
pub struct AnonThrottle<C: Clock = DefaultClock> {
    limiter: Option<Arc<KeyedLimiter<C>>>,
    clock: C,
    checks: Arc<AtomicU64>,
}

impl AnonThrottle {
    pub fn new(per_minute: u32) -> Self {
        Self::with_clock(per_minute, DefaultClock::default())
    }
}

impl<C: Clock> AnonThrottle<C> {
    pub fn with_clock(per_minute: u32, clock: C) -> Self {
        let limiter = NonZeroU32::new(per_minute).map(|limit| {
            Arc::new(RateLimiter::new(
                Quota::per_minute(limit),
                DefaultKeyedStateStore::default(),
                &clock,
            ))
        });
        Self {
            limiter,
            clock,
            checks: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Count one request from `client`; `Err(wait_seconds)` once over quota.
    fn check(&self, client: IpAddr) -> Result<(), u64> {
        let Some(limiter) = &self.limiter else {
            return Ok(());
        };

        if self.checks.fetch_add(1, Ordering::Relaxed) % PRUNE_EVERY == PRUNE_EVERY - 1 {
            self.prune();
        }

        limiter.check_key(&client).map_err(|not_until| {
            let wait = not_until.wait_time_from(self.clock.now());
            let seconds = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
            seconds.max(1)
        })
    }

    /// Forget clients whose quota has fully replenished.
    pub fn prune(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.retain_recent();
            limiter.shrink_to_fit();
        }
    }

    /// Number of client addresses currently tracked.
    pub fn tracked(&self) -> usize {
        self.limiter.as_ref().map_or(0, |limiter| limiter.len())
    }
}

impl<S, B> Transform<S, ServiceRequest> for AnonThrottle
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AnonThrottleService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AnonThrottleService {
            service,
            throttle: self.clone(),
        }))
    }
}

pub struct AnonThrottleService<S> {
    service: S,
    throttle: AnonThrottle,
}

impl<S, B> Service<ServiceRequest> for AnonThrottleService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Requests without a peer address share one bucket.
        let client = req
            .peer_addr()
            .map(|addr| addr.ip())
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

        match self.throttle.check(client) {
            Ok(()) => Box::pin(self.service.call(req)),
            Err(wait) => {
                log::warn!("Throttling {} for {}s", client, wait);
                Box::pin(ready(Err(ApiError::RateLimited { wait }.into())))
            }
        }
    }
}
