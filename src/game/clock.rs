use crate::core::Side;

/// Two countdown clocks, at most one running.
///
/// The manager only counts; the session owns the tick timer and feeds
/// [`ClockManager::tick`] once per period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockManager {
    budget: u32,
    player: u32,
    opponent: u32,
    active: Option<Side>,
}

impl ClockManager {
    pub fn new(budget_secs: u32) -> Self {
        ClockManager {
            budget: budget_secs,
            player: budget_secs,
            opponent: budget_secs,
            active: None,
        }
    }

    /// Both clocks back to the full budget, none running.
    pub fn reset(&mut self) {
        self.player = self.budget;
        self.opponent = self.budget;
        self.active = None;
    }

    /// Runs `side`'s clock. The other clock stops in the same step.
    pub fn start(&mut self, side: Side) {
        self.active = Some(side);
    }

    pub fn stop(&mut self) {
        self.active = None;
    }

    pub fn active(&self) -> Option<Side> {
        self.active
    }

    pub fn budget(&self) -> u32 {
        self.budget
    }

    pub fn remaining(&self, side: Side) -> u32 {
        match side {
            Side::Player => self.player,
            Side::Opponent => self.opponent,
        }
    }

    /// Takes one second off the running clock. Returns the side whose clock
    /// just reached zero; that clock is stopped.
    pub fn tick(&mut self) -> Option<Side> {
        let side = self.active?;
        let left = match side {
            Side::Player => &mut self.player,
            Side::Opponent => &mut self.opponent,
        };
        *left = left.saturating_sub(1);
        if *left == 0 {
            self.active = None;
            Some(side)
        } else {
            None
        }
    }
}

/// `m:ss`
pub fn format_time(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_active_clock_runs() {
        let mut clocks = ClockManager::new(600);
        assert_eq!(clocks.tick(), None);
        assert_eq!(clocks.remaining(Side::Player), 600);

        clocks.start(Side::Player);
        clocks.tick();
        clocks.tick();
        assert_eq!(clocks.remaining(Side::Player), 598);
        assert_eq!(clocks.remaining(Side::Opponent), 600);

        clocks.start(Side::Opponent);
        clocks.tick();
        assert_eq!(clocks.remaining(Side::Player), 598);
        assert_eq!(clocks.remaining(Side::Opponent), 599);
        assert_eq!(clocks.active(), Some(Side::Opponent));
    }

    #[test]
    fn test_timeout_after_exact_budget() {
        let mut clocks = ClockManager::new(600);
        clocks.start(Side::Player);
        for _ in 0..599 {
            assert_eq!(clocks.tick(), None);
        }
        assert_eq!(clocks.remaining(Side::Player), 1);
        assert_eq!(clocks.tick(), Some(Side::Player));
        assert_eq!(clocks.remaining(Side::Player), 0);
        assert_eq!(clocks.active(), None);
        // Stopped clocks stay put.
        assert_eq!(clocks.tick(), None);
    }

    #[test]
    fn test_reset_restores_budget() {
        let mut clocks = ClockManager::new(90);
        clocks.start(Side::Opponent);
        for _ in 0..30 {
            clocks.tick();
        }
        clocks.reset();
        assert_eq!(clocks, ClockManager::new(90));
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(600), "10:00");
        assert_eq!(format_time(61), "1:01");
        assert_eq!(format_time(9), "0:09");
        assert_eq!(format_time(0), "0:00");
    }
}
