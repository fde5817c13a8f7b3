//! Tick counter for time-gated boundaries.
//!
//! Ticks are discrete: one per passage attempt or one per explicit game
//! round. Nothing here reads the wall clock.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timer {
    end_time: u32,
    current_time: u32,
    is_active: bool,
}

impl Timer {
    /// A stopped timer that runs out after `end_time` ticks.
    pub fn new(end_time: u32) -> Self {
        Self {
            end_time,
            current_time: 0,
            is_active: false,
        }
    }

    pub fn end_time(&self) -> u32 {
        self.end_time
    }

    pub fn current_time(&self) -> u32 {
        self.current_time
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Activate the timer from zero. Restarting an active timer also zeroes it.
    pub fn start(&mut self) {
        self.current_time = 0;
        self.is_active = true;
    }

    /// Advance by one tick. Stopped timers ignore updates.
    pub fn update(&mut self) {
        if self.is_active {
            self.current_time = self.current_time.saturating_add(1);
        }
    }

    pub fn is_times_up(&self) -> bool {
        self.is_active && self.current_time >= self.end_time
    }

    pub fn reset(&mut self) {
        self.current_time = 0;
        self.is_active = false;
    }
}
