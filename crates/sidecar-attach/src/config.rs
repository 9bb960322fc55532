use std::time::Duration;

use crate::frame::MIN_TARGET_WIDTH;

/// Tuning for the attachment engine.
#[derive(Clone, Debug)]
pub struct AttachCfg {
    /// Quiet period after a move/resize before the companion is recomputed;
    /// roughly one display refresh.
    pub position_debounce: Duration,
    /// Quiet period after a display reconfiguration. Longer because the OS
    /// reconfigures displays in several steps.
    pub screen_debounce: Duration,
    /// Narrowest target window that gets a companion.
    pub min_target_width: f64,
}

impl Default for AttachCfg {
    fn default() -> Self {
        Self {
            position_debounce: Duration::from_millis(16),
            screen_debounce: Duration::from_millis(100),
            min_target_width: MIN_TARGET_WIDTH,
        }
    }
}
