use chrono::{Local, Timelike};

/// Source of the local wall-clock hour used by time-of-day crowd biases
pub trait Clock: Send + Sync {
    /// Hour of day, 0..=23, in the venue's local time
    fn local_hour(&self) -> u32;
}

/// Reads the host's local time
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn local_hour(&self) -> u32 {
        Local::now().hour()
    }
}

/// Always reports the same hour
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub u32);

impl Clock for FixedClock {
    fn local_hour(&self) -> u32 {
        self.0
    }
}
