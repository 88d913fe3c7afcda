//! Simulation core for a field of drifting entities that leave trails, flash,
//! and link up with nearby partners while both are reaching out.

pub mod autonomy;
pub mod behavior;
pub mod body;
pub mod clock;
pub mod config;
pub mod draw;
pub mod entity;
pub mod heart;
pub mod input;
pub mod proximity;
pub mod signal;
pub mod sim;
pub mod trail;
pub mod vec2;

pub use behavior::{BehaviorSource, Bounds, Intent, PlayerControl};
pub use config::{ConfigError, RenderStyleKind, SimConfig, SpawnLayout};
pub use entity::Entity;
pub use input::{InputSnapshot, InputState, Key};
pub use proximity::Connection;
pub use sim::Simulation;
pub use vec2::Vec2;
