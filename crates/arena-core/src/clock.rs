//! Per-move countdown clocks.
//!
//! Each side has a fixed budget per move. Arming a clock always refills it to
//! the full budget; the clock counts down one second per tick while armed and
//! reports expiry once.

use crate::game_data::Side;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clock {
    budget: u32,
    remaining: u32,
    armed: bool,
    expired: bool,
}

impl Clock {
    pub fn new(budget_secs: u32) -> Self {
        Self {
            budget: budget_secs,
            remaining: budget_secs,
            armed: false,
            expired: false,
        }
    }

    pub fn arm(&mut self) {
        self.remaining = self.budget;
        self.armed = true;
        self.expired = false;
    }

    pub fn disarm(&mut self) {
        self.armed = false;
    }

    /// Count down one second. Returns true only on the tick that hits zero.
    pub fn tick(&mut self) -> bool {
        if !self.armed || self.expired {
            return false;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.expired = true;
            return true;
        }
        false
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }
}

/// White and black clocks; at most one is armed at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockPair {
    clocks: [Clock; 2],
}

impl ClockPair {
    pub fn new(budget_secs: u32) -> Self {
        Self {
            clocks: [Clock::new(budget_secs), Clock::new(budget_secs)],
        }
    }

    /// Arm `side` with a fresh budget and disarm the other clock.
    pub fn arm(&mut self, side: Side) {
        self.clocks[side.opponent().index()].disarm();
        self.clocks[side.index()].arm();
    }

    pub fn disarm_all(&mut self) {
        for clock in &mut self.clocks {
            clock.disarm();
        }
    }

    /// Tick both clocks; returns the side whose clock just ran out.
    pub fn tick(&mut self) -> Option<Side> {
        [Side::White, Side::Black]
            .into_iter()
            .find(|side| self.clocks[side.index()].tick())
    }

    pub fn clock(&self, side: Side) -> &Clock {
        &self.clocks[side.index()]
    }

    pub fn armed_side(&self) -> Option<Side> {
        [Side::White, Side::Black]
            .into_iter()
            .find(|side| self.clocks[side.index()].is_armed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_exactly_once() {
        let mut clock = Clock::new(3);
        clock.arm();
        assert!(!clock.tick());
        assert!(!clock.tick());
        assert!(clock.tick());
        assert_eq!(clock.remaining(), 0);
        for _ in 0..5 {
            assert!(!clock.tick());
        }
    }

    #[test]
    fn test_disarmed_clock_does_not_count() {
        let mut clock = Clock::new(60);
        assert!(!clock.tick());
        assert_eq!(clock.remaining(), 60);
    }

    #[test]
    fn test_rearm_resets_to_full_budget() {
        let mut clock = Clock::new(60);
        clock.arm();
        for _ in 0..45 {
            clock.tick();
        }
        assert_eq!(clock.remaining(), 15);
        clock.disarm();
        clock.arm();
        assert_eq!(clock.remaining(), 60);
    }

    #[test]
    fn test_pair_arms_one_side_at_a_time() {
        let mut pair = ClockPair::new(60);
        pair.arm(Side::White);
        assert_eq!(pair.armed_side(), Some(Side::White));
        pair.tick();
        assert_eq!(pair.clock(Side::White).remaining(), 59);
        assert_eq!(pair.clock(Side::Black).remaining(), 60);

        pair.arm(Side::Black);
        assert_eq!(pair.armed_side(), Some(Side::Black));
        assert!(!pair.clock(Side::White).is_armed());

        pair.disarm_all();
        assert_eq!(pair.armed_side(), None);
    }

    #[test]
    fn test_pair_reports_expired_side() {
        let mut pair = ClockPair::new(60);
        pair.arm(Side::Black);
        let expired: Vec<_> = (0..70).filter_map(|_| pair.tick()).collect();
        assert_eq!(expired, vec![Side::Black]);
    }
}
