/// Outcome of a single countdown tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Still counting; carries the value shown to the user this tick.
    Counting(i32),
    /// The counter went negative. It has already been reset; run one poll cycle.
    Poll { shown: i32 },
}

/// Visible "next refresh in N s" counter.
///
/// Each tick shows the current value and then decrements it. The tick that
/// takes it below zero resets it to the period and asks for a poll, so a
/// counter starting at 10 polls on its 11th tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    remaining: i32,
    period: i32,
}

impl Countdown {
    pub const DEFAULT_PERIOD: i32 = 10;

    pub fn new(period: i32) -> Self {
        let period = period.max(0);
        Self {
            remaining: period,
            period,
        }
    }

    pub fn remaining(&self) -> i32 {
        self.remaining
    }

    pub fn period(&self) -> i32 {
        self.period
    }

    pub fn tick(&mut self) -> Tick {
        let shown = self.remaining;
        self.remaining -= 1;

        if self.remaining < 0 {
            self.remaining = self.period;
            Tick::Poll { shown }
        } else {
            Tick::Counting(shown)
        }
    }

    /// Start a fresh period, used after an out-of-band poll.
    pub fn reset(&mut self) {
        self.remaining = self.period;
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PERIOD)
    }
}
