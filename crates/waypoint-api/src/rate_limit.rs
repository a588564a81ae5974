//! Fixed-window rate limiter middleware.
//!
//! Limits requests to a configurable number per second using an atomic
//! counter that resets each second. Applied to `/chat` only.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::{Extension, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::ApiError;

/// Shared state for the rate limiter.
#[derive(Clone)]
pub struct RateLimiter {
    /// Maximum requests allowed per second.
    max_per_sec: u64,
    /// Requests counted in the active window.
    count: Arc<AtomicU64>,
    /// The epoch second of the current window.
    window: Arc<AtomicU64>,
}

impl RateLimiter {
    pub fn new(max_per_sec: u64) -> Self {
        Self {
            max_per_sec,
            count: Arc::new(AtomicU64::new(0)),
            window: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn max_per_sec(&self) -> u64 {
        self.max_per_sec
    }

    /// Try to acquire a permit. Returns true if the request is allowed.
    pub fn try_acquire(&self) -> bool {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        self.try_acquire_at(now)
    }

    fn try_acquire_at(&self, now: u64) -> bool {
        let current_window = self.window.load(Ordering::Relaxed);
        if now != current_window
            && self
                .window
                .compare_exchange(current_window, now, Ordering::AcqRel, Ordering::Relaxed)
                .is_ok()
        {
            self.count.store(1, Ordering::Relaxed);
            return true;
        }

        let prev = self.count.fetch_add(1, Ordering::Relaxed);
        prev < self.max_per_sec
    }
}

/// Axum middleware that enforces the rate limit.
pub async fn rate_limit_middleware(
    Extension(limiter): Extension<RateLimiter>,
    req: Request,
    next: Next,
) -> Response {
    if limiter.try_acquire() {
        next.run(req).await
    } else {
        tracing::warn!(
            path = %req.uri().path(),
            limit = limiter.max_per_sec(),
            "Rate limit exceeded"
        );
        ApiError::TooManyRequests.into_response()
    }
}
