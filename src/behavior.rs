use crate::autonomy::Autonomous;
use crate::config::AutonomyConfig;
use crate::input::{InputSnapshot, Key};
use crate::vec2::Vec2;
use rand::Rng;

/// Current dimensions of the rendering surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }
}

/// What a behavior source wants this frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Intent {
    /// Per-axis acceleration in [-1, 1].
    pub accel: Vec2,
    pub connecting: bool,
    /// Re-arm the flash this frame.
    pub identify: bool,
}

/// Reads the held-key table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlayerControl;

impl PlayerControl {
    pub fn read(&self, input: &InputSnapshot<'_>) -> Intent {
        Intent {
            accel: Vec2::new(
                input.axis(Key::Left, Key::Right),
                input.axis(Key::Up, Key::Down),
            ),
            connecting: input.held(Key::Connect),
            identify: input.pressed(Key::Identify),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BehaviorSource {
    Player(PlayerControl),
    Autonomous(Autonomous),
}

impl BehaviorSource {
    pub fn is_player(&self) -> bool {
        matches!(self, BehaviorSource::Player(_))
    }

    pub fn intent<R: Rng + ?Sized>(
        &mut self,
        input: &InputSnapshot<'_>,
        position: Vec2,
        bounds: Bounds,
        config: &AutonomyConfig,
        rng: &mut R,
    ) -> Intent {
        match self {
            BehaviorSource::Player(control) => control.read(input),
            BehaviorSource::Autonomous(brain) => brain.tick(position, bounds, rng, config),
        }
    }
}
