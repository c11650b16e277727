use std::future::Future;
use std::time::{Duration, Instant};

/// Injectable time source for backoff waits and the elapsed-time budget.
/// Production code uses [`TokioClock`]; tests substitute a manual clock to
/// simulate elapsed time without real delays.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}
