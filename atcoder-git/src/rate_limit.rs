use std::cell::Cell;
use std::time::{Duration, Instant};

/// Source of time for a `RateLimiter`, so tests can run without sleeping.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

/// The wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// References to `Clock`s are also `Clock`s.
impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

/// Spaces out consecutive calls so that at least `interval` passes between the end
/// of one call and the start of the next. The first call never waits.
///
/// Each limited endpoint owns its own `RateLimiter`; there is no shared global state.
/// Not `Sync`: runs are single-threaded.
pub struct RateLimiter<C: Clock = SystemClock> {
    interval: Duration,
    clock: C,
    next_allowed: Cell<Option<Instant>>,
}

impl RateLimiter<SystemClock> {
    pub fn new(interval: Duration) -> Self {
        Self::with_clock(interval, SystemClock)
    }
}

impl<C: Clock> RateLimiter<C> {
    pub fn with_clock(interval: Duration, clock: C) -> Self {
        Self {
            interval,
            clock,
            next_allowed: Cell::new(None),
        }
    }

    /// Runs `operation` once the interval since the previous call has elapsed.
    /// The next allowed time is pushed forward even when `operation` returns an error,
    /// so an immediate retry by the caller is still throttled.
    pub fn call<T>(&self, operation: impl FnOnce() -> T) -> T {
        if let Some(next_allowed) = self.next_allowed.get() {
            let now = self.clock.now();
            if now < next_allowed {
                let wait = next_allowed - now;
                tracing::debug!("Rate limited: sleeping for {:?}", wait);
                self.clock.sleep(wait);
            }
        }

        let result = operation();

        self.next_allowed.set(Some(self.clock.now() + self.interval));
        result
    }
}

/// Wraps `operation` in its own `RateLimiter`. Multiple arguments can be passed as a tuple.
pub fn limit<A, T>(interval: Duration, mut operation: impl FnMut(A) -> T) -> impl FnMut(A) -> T {
    let limiter = RateLimiter::new(interval);
    move |args| limiter.call(|| operation(args))
}
