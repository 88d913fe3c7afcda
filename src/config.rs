use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating a [`SimConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
    #[error("{name} must be a probability in [0, 1], got {value}")]
    Probability { name: &'static str, value: f32 },
    #[error("{name} dwell range {min}..={max} must be non-empty and start above zero")]
    Dwell {
        name: &'static str,
        min: u32,
        max: u32,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Initial placement of the population.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SpawnLayout {
    /// Uniformly across the surface, away from the edge margin.
    #[default]
    Random,
    /// Around the surface center within `cluster_radius`.
    Clustered,
    /// Player at the center, autonomous entities on a ring around it.
    Centered,
}

/// Visual style picked by the host renderer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RenderStyleKind {
    #[default]
    Squares,
    Orbs,
}

/// Inclusive frame-count range a dwell timer is drawn from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DwellRange {
    pub min: u32,
    pub max: u32,
}

impl DwellRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    fn check(&self, name: &'static str) -> Result<(), ConfigError> {
        if self.min == 0 || self.min > self.max {
            return Err(ConfigError::Dwell {
                name,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Decision policy for autonomous entities.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AutonomyConfig {
    /// Distance from a surface edge that forces steering back inward.
    pub edge_margin: f32,
    /// Chance that a motion decision picks standing still.
    pub idle_probability: f32,
    /// Chance that an expired disconnected phase switches to connecting.
    pub connect_probability: f32,
    /// Per-frame chance of a spontaneous identify flash.
    pub signal_chance: f32,
    pub move_dwell: DwellRange,
    pub connect_dwell: DwellRange,
    pub disconnect_dwell: DwellRange,
}

impl Default for AutonomyConfig {
    fn default() -> Self {
        Self {
            edge_margin: 50.0,
            idle_probability: 0.3,
            connect_probability: 0.5,
            signal_chance: 0.003,
            move_dwell: DwellRange::new(30, 120),
            connect_dwell: DwellRange::new(90, 240),
            disconnect_dwell: DwellRange::new(60, 300),
        }
    }
}

/// Heart-rate model driving the pulse waveform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HeartConfig {
    /// Resting rate in beats per minute.
    pub rest_rate: f32,
    /// Amplitude of the slow resting oscillation.
    pub rest_swing: f32,
    /// Angular speed of the resting oscillation, per second of sim time.
    pub rest_wave: f32,
    pub max_rate: f32,
    /// Rate increase per frame while moving.
    pub exertion_step: f32,
    /// Target rate while connected.
    pub calm_rate: f32,
    /// Fraction of the gap to `calm_rate` closed per connected frame.
    pub calm_ease: f32,
}

impl Default for HeartConfig {
    fn default() -> Self {
        Self {
            rest_rate: 60.0,
            rest_swing: 5.0,
            rest_wave: 0.5,
            max_rate: 120.0,
            exertion_step: 0.05,
            calm_rate: 55.0,
            calm_ease: 0.05,
        }
    }
}

/// Static configuration for one simulation instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    /// Surface width in pixels.
    pub width: f32,
    /// Surface height in pixels.
    pub height: f32,
    /// Whether a player-controlled entity is spawned.
    pub player: bool,
    /// Number of autonomous entities.
    pub autonomous_count: usize,
    pub layout: SpawnLayout,
    /// Radius used by the clustered and centered layouts.
    pub cluster_radius: f32,
    /// Acceleration scale applied to steering input.
    pub speed: f32,
    /// Velocity retention per frame, in (0, 1).
    pub friction: f32,
    pub trail_length: usize,
    /// Distance below which two connecting entities link up.
    pub connect_distance: f32,
    /// Signal lost per frame.
    pub signal_decay: f32,
    /// Signal gained per frame while linked.
    pub link_boost: f32,
    /// Upper bound for link feedback; must not be below a full flash.
    pub link_ceiling: f32,
    /// Simulation seconds per frame.
    pub frame_dt: f32,
    pub rng_seed: Option<u64>,
    pub style: RenderStyleKind,
    pub autonomy: AutonomyConfig,
    pub heart: HeartConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            player: true,
            autonomous_count: 24,
            layout: SpawnLayout::Random,
            cluster_radius: 200.0,
            speed: 0.4,
            friction: 0.9,
            trail_length: 20,
            connect_distance: 100.0,
            signal_decay: 0.02,
            link_boost: 0.03,
            link_ceiling: 1.5,
            frame_dt: 0.016,
            rng_seed: None,
            style: RenderStyleKind::Squares,
            autonomy: AutonomyConfig::default(),
            heart: HeartConfig::default(),
        }
    }
}

fn probability(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::Probability { name, value });
    }
    Ok(())
}

impl SimConfig {
    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.width > 0.0) || !(self.height > 0.0) {
            return Err(ConfigError::Invalid("surface dimensions must be positive"));
        }
        if !(self.speed >= 0.0) {
            return Err(ConfigError::Invalid("speed must be non-negative"));
        }
        if !(self.friction > 0.0 && self.friction < 1.0) {
            return Err(ConfigError::Invalid("friction must lie strictly between 0 and 1"));
        }
        if self.trail_length == 0 {
            return Err(ConfigError::Invalid("trail_length must be non-zero"));
        }
        if !(self.connect_distance > 0.0) {
            return Err(ConfigError::Invalid("connect_distance must be positive"));
        }
        if !(self.signal_decay > 0.0) {
            return Err(ConfigError::Invalid("signal_decay must be positive"));
        }
        if !(self.link_boost >= 0.0) {
            return Err(ConfigError::Invalid("link_boost must be non-negative"));
        }
        if !(self.link_ceiling >= 1.0) {
            return Err(ConfigError::Invalid("link_ceiling must be at least 1.0"));
        }
        if !(self.frame_dt > 0.0) {
            return Err(ConfigError::Invalid("frame_dt must be positive"));
        }
        if !(self.cluster_radius >= 0.0) {
            return Err(ConfigError::Invalid("cluster_radius must be non-negative"));
        }

        let auto = &self.autonomy;
        if !(auto.edge_margin >= 0.0) {
            return Err(ConfigError::Invalid("edge_margin must be non-negative"));
        }
        probability("idle_probability", auto.idle_probability)?;
        probability("connect_probability", auto.connect_probability)?;
        probability("signal_chance", auto.signal_chance)?;
        auto.move_dwell.check("move")?;
        auto.connect_dwell.check("connect")?;
        auto.disconnect_dwell.check("disconnect")?;

        let heart = &self.heart;
        if !(heart.rest_rate > 0.0 && heart.max_rate >= heart.rest_rate && heart.calm_rate > 0.0)
        {
            return Err(ConfigError::Invalid(
                "heart rates must be positive with max_rate >= rest_rate",
            ));
        }
        probability("calm_ease", heart.calm_ease)?;
        if !(heart.exertion_step >= 0.0) {
            return Err(ConfigError::Invalid("exertion_step must be non-negative"));
        }
        Ok(())
    }
}
