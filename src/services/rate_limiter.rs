use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::time::{sleep, Duration, Instant};
use parking_lot::Mutex;

/// Caps concurrent quote requests and keeps them inside the provider's
/// per-minute quota (Finnhub free tier: 60/min).
///
/// The quota is a token bucket: a full minute's worth of requests may go out
/// at once, after which tokens refill evenly over the minute.
pub struct RateLimiter {
    semaphore: Arc<Semaphore>,
    bucket: Mutex<Bucket>,
    capacity: f64,
    refill_per_sec: f64,
}

struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

impl RateLimiter {
    pub fn new(max_concurrent: usize, requests_per_minute: u32) -> Self {
        Self::with_burst(max_concurrent, requests_per_minute, requests_per_minute)
    }

    /// Like `new`, with the bucket holding at most `burst` tokens.
    pub fn with_burst(max_concurrent: usize, requests_per_minute: u32, burst: u32) -> Self {
        let capacity = burst.max(1) as f64;
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
            bucket: Mutex::new(Bucket {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
            capacity,
            refill_per_sec: requests_per_minute.max(1) as f64 / 60.0,
        }
    }

    /// Waits for a free slot and a token. The slot is released when the guard
    /// is dropped; the token is not returned.
    pub async fn acquire(&self) -> RateLimitGuard {
        // The semaphore is never closed, so acquisition only fails after drop.
        let permit = self.semaphore.clone().acquire_owned().await.ok();

        loop {
            // Take a token under the lock, sleep outside it
            let wait_time = {
                let mut bucket = self.bucket.lock();
                let now = Instant::now();
                let refilled = now.duration_since(bucket.last_refill).as_secs_f64() * self.refill_per_sec;
                bucket.tokens = (bucket.tokens + refilled).min(self.capacity);
                bucket.last_refill = now;

                if bucket.tokens >= 1.0 {
                    bucket.tokens -= 1.0;
                    None
                } else {
                    Some(Duration::from_secs_f64((1.0 - bucket.tokens) / self.refill_per_sec))
                }
            };

            match wait_time {
                None => break,
                Some(wait) => sleep(wait).await,
            }
        }

        RateLimitGuard { _permit: permit }
    }

    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }
}

/// Guard that holds a rate limit permit
pub struct RateLimitGuard {
    _permit: Option<tokio::sync::OwnedSemaphorePermit>,
}
