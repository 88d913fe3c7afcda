use crate::behavior::{BehaviorSource, Intent};
use crate::body::KineticBody;
use crate::config::SimConfig;
use crate::heart::Heartbeat;
use crate::signal::Signal;
use crate::trail::Trail;
use crate::vec2::Vec2;

/// One simulated participant, player or autonomous.
#[derive(Debug, Clone)]
pub struct Entity {
    pub body: KineticBody,
    pub signal: Signal,
    pub trail: Trail,
    pub heart: Heartbeat,
    behavior: BehaviorSource,
    desired_direction: Vec2,
    connected: bool,
}

impl Entity {
    pub fn new(position: Vec2, behavior: BehaviorSource, config: &SimConfig) -> Self {
        Self {
            body: KineticBody::at(position),
            signal: Signal::default(),
            trail: Trail::new(config.trail_length),
            heart: Heartbeat::new(&config.heart),
            behavior,
            desired_direction: Vec2::ZERO,
            connected: false,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.body.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.body.velocity
    }

    pub fn is_controlled(&self) -> bool {
        self.behavior.is_player()
    }

    pub fn signal_level(&self) -> f32 {
        self.signal.level()
    }

    pub fn connecting(&self) -> bool {
        self.signal.connecting
    }

    /// Whether the entity took part in at least one link this frame.
    pub fn connected(&self) -> bool {
        self.connected
    }

    pub fn desired_direction(&self) -> Vec2 {
        self.desired_direction
    }

    pub fn behavior(&self) -> &BehaviorSource {
        &self.behavior
    }

    pub(crate) fn behavior_mut(&mut self) -> &mut BehaviorSource {
        &mut self.behavior
    }

    pub(crate) fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    /// Run the per-entity half of a frame: decay, apply intent, integrate, record.
    pub(crate) fn apply(&mut self, intent: Intent, config: &SimConfig) {
        self.signal.decay(config.signal_decay);
        if intent.identify {
            self.signal.trigger();
        }
        self.signal.connecting = intent.connecting;
        self.desired_direction = intent.accel;
        self.body.integrate(intent.accel, config.speed, config.friction);
        self.trail.record(self.body.position);
    }
}
