//! Adaptive refresh interval.

use lm_core::EngineConfig;

/// Chooses between the normal and the slower "scenic" refresh interval from
/// the size of the last batch.
///
/// Hysteresis: the scenic interval is entered above `enter_count` entities
/// and left below `exit_count`; counts in between keep the current mode.
#[derive(Clone, Debug, PartialEq)]
pub struct RefreshCadence {
    normal_ms:   u64,
    scenic_ms:   u64,
    enter_count: usize,
    exit_count:  usize,
    scenic:      bool,
}

impl RefreshCadence {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            normal_ms:   config.refresh_interval_ms,
            scenic_ms:   config.scenic_refresh_interval_ms,
            enter_count: config.scenic_enter_count,
            exit_count:  config.scenic_exit_count,
            scenic:      false,
        }
    }

    /// Feed the size of a batch.  Returns `true` if the mode changed.
    pub fn observe(&mut self, entity_count: usize) -> bool {
        let next = if entity_count > self.enter_count {
            true
        } else if entity_count < self.exit_count {
            false
        } else {
            self.scenic
        };
        let changed = next != self.scenic;
        if changed {
            tracing::info!(entity_count, scenic = next, "refresh cadence changed");
        }
        self.scenic = next;
        changed
    }

    #[inline]
    pub fn is_scenic(&self) -> bool {
        self.scenic
    }

    /// Milliseconds until the next refresh should be scheduled.
    pub fn interval_ms(&self) -> u64 {
        if self.scenic { self.scenic_ms } else { self.normal_ms }
    }
}
