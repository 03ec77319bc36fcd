//! Restartable one-second countdown.
//!
//! The timer holds no clock of its own: whoever owns it calls [`CountdownTimer::tick`]
//! once per elapsed second. Tests advance it by calling `tick` directly.

/// What a single tick did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    /// No countdown is running.
    Idle,
    /// Still counting; seconds left.
    Running(u32),
    /// This tick reached zero.
    Elapsed,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CountdownTimer {
    remaining: u32,
}

impl CountdownTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting down from `secs`, replacing any running countdown.
    pub fn start(&mut self, secs: u32) {
        self.remaining = secs;
    }

    /// Restart from `secs`. Same effect as [`start`](Self::start); the count
    /// is replaced, never accumulated.
    pub fn reset(&mut self, secs: u32) {
        self.start(secs);
    }

    /// Stop and zero the countdown.
    pub fn cancel(&mut self) {
        self.remaining = 0;
    }

    /// Advance by one second.
    pub fn tick(&mut self) -> Tick {
        match self.remaining {
            0 => Tick::Idle,
            1 => {
                self.remaining = 0;
                Tick::Elapsed
            }
            n => {
                self.remaining = n - 1;
                Tick::Running(self.remaining)
            }
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.remaining > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sixty_ticks_reach_zero() {
        let mut timer = CountdownTimer::new();
        timer.start(60);
        for i in 1..60 {
            assert_eq!(timer.tick(), Tick::Running(60 - i));
            assert!(timer.is_running());
        }
        assert_eq!(timer.tick(), Tick::Elapsed);
        assert_eq!(timer.remaining(), 0);
        assert!(!timer.is_running());
        assert_eq!(timer.tick(), Tick::Idle);
    }

    #[test]
    fn start_while_running_replaces_count() {
        let mut timer = CountdownTimer::new();
        timer.start(60);
        for _ in 0..10 {
            timer.tick();
        }
        timer.start(60);
        assert_eq!(timer.remaining(), 60);
        timer.reset(30);
        assert_eq!(timer.remaining(), 30);
    }

    #[test]
    fn cancel_stops() {
        let mut timer = CountdownTimer::new();
        timer.start(5);
        timer.cancel();
        assert_eq!(timer.tick(), Tick::Idle);
        assert!(!timer.is_running());
    }

    #[test]
    fn zero_second_start_is_idle() {
        let mut timer = CountdownTimer::new();
        timer.start(0);
        assert!(!timer.is_running());
        assert_eq!(timer.tick(), Tick::Idle);
    }
}
