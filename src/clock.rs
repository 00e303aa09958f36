//! Monotonic time source used for readiness polling

/// Monotonic millisecond clock
///
/// Any `Fn() -> u64` closure is a clock, so a HAL timer can be plugged in
/// directly, e.g. `|| timer.now().ticks() / 1_000`.
pub trait Clock {
    /// Milliseconds since an arbitrary fixed point
    fn now_ms(&self) -> u64;
}

impl<F> Clock for F
where
    F: Fn() -> u64,
{
    fn now_ms(&self) -> u64 {
        self()
    }
}

/// Clock backed by [`std::time::Instant`]
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy)]
pub struct StdClock {
    epoch: std::time::Instant,
}

#[cfg(feature = "std")]
impl StdClock {
    /// Create a clock counting from now
    pub fn new() -> Self {
        Self {
            epoch: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for StdClock {
    fn now_ms(&self) -> u64 {
        // Saturates after roughly 584 million years
        u64::try_from(self.epoch.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    #[test]
    fn test_closure_clock() {
        let ticks = Cell::new(5u64);
        let clock = || ticks.get();
        assert_eq!(clock.now_ms(), 5);
        ticks.set(250);
        assert_eq!(clock.now_ms(), 250);
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_std_clock_is_monotonic() {
        let clock = StdClock::new();
        let first = clock.now_ms();
        assert!(clock.now_ms() >= first);
    }
}
