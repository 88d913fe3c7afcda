/// Level of a full identify flash.
pub const FLASH_LEVEL: f32 = 1.0;

/// Flash intensity plus the connecting latch, both read by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Signal {
    level: f32,
    pub connecting: bool,
}

impl Signal {
    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn decay(&mut self, rate: f32) {
        self.level = (self.level - rate).max(0.0);
    }

    /// Re-arm the flash. No cooldown.
    pub fn trigger(&mut self) {
        self.level = FLASH_LEVEL;
    }

    /// Raise the level by `amount` without passing `ceiling`.
    pub fn boost(&mut self, amount: f32, ceiling: f32) {
        if self.level < ceiling {
            self.level = (self.level + amount).min(ceiling);
        }
    }
}
