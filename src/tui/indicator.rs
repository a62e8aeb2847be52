//! Busy indicator shown in the Bot placeholder while a reply is pending.

use std::time::Duration;

/// Braille spinner, one frame per tick.
pub const FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Fixed period between indicator ticks.
pub const TICK_RATE: Duration = Duration::from_millis(100);

#[derive(Debug, Default)]
pub struct BusyIndicator {
    frame: usize,
    active: bool,
}

impl BusyIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restart from frame 0.
    pub fn start(&mut self) {
        self.frame = 0;
        self.active = true;
    }

    pub fn stop(&mut self) {
        self.active = false;
    }

    #[cfg(test)]
    fn is_active(&self) -> bool {
        self.active
    }

    #[cfg(test)]
    fn frame_index(&self) -> usize {
        self.frame
    }

    pub fn current(&self) -> &'static str {
        FRAMES[self.frame % FRAMES.len()]
    }

    /// Step to the next frame, wrapping. Inactive indicators don't move.
    pub fn advance(&mut self) -> &'static str {
        if self.active {
            self.frame = (self.frame + 1) % FRAMES.len();
        }
        self.current()
    }
}
