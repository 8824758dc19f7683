use std::time::{Duration, SystemTime, UNIX_EPOCH};

mod actor;
pub use actor::Actor;
mod ingress;
pub use ingress::{Mailbox, Message};

/// Configuration for the table actor.
#[derive(Clone, Debug)]
pub struct Config {
    /// How often a running countdown re-enters the engine.
    pub tick_interval: Duration,

    /// Number of pending commands to hold before senders wait.
    pub mailbox_size: usize,
}

/// Source of the current time in unix seconds.
pub trait Clock: Send + 'static {
    fn now(&self) -> u64;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or(0)
    }
}
