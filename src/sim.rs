use crate::autonomy::Autonomous;
use crate::behavior::{BehaviorSource, Bounds, PlayerControl};
use crate::clock::Clock;
use crate::config::{ConfigError, SimConfig, SpawnLayout};
use crate::entity::Entity;
use crate::input::InputSnapshot;
use crate::proximity::{Connection, ProximityGraph};
use crate::vec2::Vec2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;
use tracing::{debug, info};

/// Frames between periodic debug summaries.
const SUMMARY_INTERVAL: u64 = 600;

/// Simulation context: configuration, clock, entities and the per-frame link graph.
pub struct Simulation {
    config: SimConfig,
    bounds: Bounds,
    clock: Clock,
    rng: SmallRng,
    entities: Vec<Entity>,
    graph: ProximityGraph,
}

impl Simulation {
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = match config.rng_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let bounds = Bounds {
            width: config.width,
            height: config.height,
        };
        let entities = spawn(&config, bounds, &mut rng);
        info!(
            entities = entities.len(),
            player = config.player,
            layout = ?config.layout,
            "spawned population"
        );
        Ok(Self {
            clock: Clock::new(config.frame_dt),
            config,
            bounds,
            rng,
            entities,
            graph: ProximityGraph::new(),
        })
    }

    /// Build around explicitly placed entities instead of a spawn layout.
    /// At most one entity may be player-controlled and every trail must use the
    /// configured `trail_length`.
    pub fn with_entities(config: SimConfig, entities: Vec<Entity>) -> Result<Self, ConfigError> {
        config.validate()?;
        if entities.iter().filter(|e| e.is_controlled()).count() > 1 {
            return Err(ConfigError::Invalid(
                "at most one entity may be player-controlled",
            ));
        }
        if entities
            .iter()
            .any(|e| e.trail.bound() != config.trail_length)
        {
            return Err(ConfigError::Invalid(
                "entity trail bound must match trail_length",
            ));
        }
        let rng = match config.rng_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Ok(Self {
            clock: Clock::new(config.frame_dt),
            bounds: Bounds {
                width: config.width,
                height: config.height,
            },
            config,
            rng,
            entities,
            graph: ProximityGraph::new(),
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn player(&self) -> Option<&Entity> {
        self.entities.iter().find(|e| e.is_controlled())
    }

    /// Links found during the last [`Simulation::step`].
    pub fn connections(&self) -> &[Connection] {
        self.graph.links()
    }

    /// Surface changed size. Only edge avoidance sees the new bounds.
    pub fn resize(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.bounds = Bounds { width, height };
            debug!(width, height, "surface resized");
        }
    }

    /// Advance one frame.
    pub fn step(&mut self, input: &InputSnapshot<'_>) -> &[Connection] {
        self.clock.advance();

        let config = &self.config;
        for entity in &mut self.entities {
            let position = entity.position();
            let intent = entity.behavior_mut().intent(
                input,
                position,
                self.bounds,
                &config.autonomy,
                &mut self.rng,
            );
            entity.apply(intent, config);
        }

        self.graph.scan(&self.entities, config.connect_distance);
        self.graph
            .apply_feedback(&mut self.entities, config.link_boost, config.link_ceiling);

        let time = self.clock.time();
        for entity in &mut self.entities {
            let moving = !entity.desired_direction().is_zero();
            let connected = entity.connected();
            entity.heart.update(moving, connected, time, &config.heart);
        }

        if self.clock.frame() % SUMMARY_INTERVAL == 0 {
            debug!(
                frame = self.clock.frame(),
                links = self.graph.links().len(),
                connecting = self.entities.iter().filter(|e| e.connecting()).count(),
                "frame summary"
            );
        }

        self.graph.links()
    }
}

fn spawn(config: &SimConfig, bounds: Bounds, rng: &mut SmallRng) -> Vec<Entity> {
    let mut entities = Vec::with_capacity(config.autonomous_count + usize::from(config.player));
    let center = bounds.center();

    if config.player {
        let position = match config.layout {
            SpawnLayout::Random => random_interior(bounds, config.autonomy.edge_margin, rng),
            SpawnLayout::Clustered | SpawnLayout::Centered => center,
        };
        entities.push(Entity::new(
            position,
            BehaviorSource::Player(PlayerControl),
            config,
        ));
    }

    for index in 0..config.autonomous_count {
        let position = match config.layout {
            SpawnLayout::Random => random_interior(bounds, config.autonomy.edge_margin, rng),
            SpawnLayout::Clustered => {
                let angle = rng.gen_range(0.0..TAU);
                let radius = config.cluster_radius * rng.r#gen::<f32>().sqrt();
                center + Vec2::new(angle.cos(), angle.sin()) * radius
            }
            SpawnLayout::Centered => {
                let angle = TAU * index as f32 / config.autonomous_count as f32;
                center + Vec2::new(angle.cos(), angle.sin()) * config.cluster_radius
            }
        };
        let brain = Autonomous::new(rng, &config.autonomy);
        entities.push(Entity::new(
            position,
            BehaviorSource::Autonomous(brain),
            config,
        ));
    }
    entities
}

fn random_interior(bounds: Bounds, margin: f32, rng: &mut SmallRng) -> Vec2 {
    let axis = |extent: f32, rng: &mut SmallRng| {
        if extent > 2.0 * margin {
            rng.gen_range(margin..extent - margin)
        } else {
            extent * 0.5
        }
    };
    let x = axis(bounds.width, rng);
    let y = axis(bounds.height, rng);
    Vec2::new(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{InputState, Key};

    fn seeded(config: SimConfig) -> Simulation {
        Simulation::new(SimConfig {
            rng_seed: Some(0xC0FFEE),
            ..config
        })
        .expect("valid config")
    }

    #[test]
    fn spawns_one_player_and_requested_autonomous() {
        let sim = seeded(SimConfig {
            autonomous_count: 7,
            ..SimConfig::default()
        });
        assert_eq!(sim.entities().len(), 8);
        assert_eq!(sim.entities().iter().filter(|e| e.is_controlled()).count(), 1);
        assert!(sim.player().is_some());
    }

    #[test]
    fn solo_demo_has_no_player() {
        let sim = seeded(SimConfig {
            player: false,
            autonomous_count: 3,
            ..SimConfig::default()
        });
        assert!(sim.player().is_none());
        assert_eq!(sim.entities().len(), 3);
    }

    #[test]
    fn centered_layout_puts_player_in_middle() {
        let sim = seeded(SimConfig {
            layout: SpawnLayout::Centered,
            autonomous_count: 4,
            cluster_radius: 150.0,
            ..SimConfig::default()
        });
        let center = sim.bounds().center();
        let player = sim.player().expect("player");
        assert_eq!(player.position(), center);
        for other in sim.entities().iter().filter(|e| !e.is_controlled()) {
            let d = other.position().distance_squared(center).sqrt();
            assert!((d - 150.0).abs() < 1e-3);
        }
    }

    #[test]
    fn clustered_layout_stays_within_radius() {
        let sim = seeded(SimConfig {
            layout: SpawnLayout::Clustered,
            autonomous_count: 50,
            cluster_radius: 80.0,
            ..SimConfig::default()
        });
        let center = sim.bounds().center();
        for entity in sim.entities() {
            assert!(entity.position().distance_squared(center) <= 80.0 * 80.0 + 1e-2);
        }
    }

    #[test]
    fn player_keys_drive_motion_and_trail() {
        let mut sim = seeded(SimConfig {
            autonomous_count: 0,
            layout: SpawnLayout::Centered,
            ..SimConfig::default()
        });
        let start = sim.player().expect("player").position();
        let mut input = InputState::new();
        input.press(Key::Right);
        for _ in 0..5 {
            sim.step(&input.snapshot());
            input.end_frame();
        }
        let player = sim.player().expect("player");
        assert!(player.position().x > start.x);
        assert_eq!(player.position().y, start.y);
        assert_eq!(player.trail.len(), 5);
        assert_eq!(player.trail.newest(), Some(player.position()));
        assert_eq!(sim.clock().frame(), 5);
    }

    #[test]
    fn identify_sets_full_flash_then_decays_next_frame() {
        let mut sim = seeded(SimConfig {
            autonomous_count: 0,
            ..SimConfig::default()
        });
        let mut input = InputState::new();
        input.press(Key::Identify);
        sim.step(&input.snapshot());
        input.end_frame();
        assert_eq!(sim.player().expect("player").signal_level(), 1.0);
        sim.step(&input.snapshot());
        let decay = sim.config().signal_decay;
        let level = sim.player().expect("player").signal_level();
        assert!((level - (1.0 - decay)).abs() < 1e-6);
    }

    #[test]
    fn resize_only_touches_bounds() {
        let mut sim = seeded(SimConfig::default());
        let before: Vec<Vec2> = sim.entities().iter().map(|e| e.position()).collect();
        sim.resize(1024.0, 768.0);
        let after: Vec<Vec2> = sim.entities().iter().map(|e| e.position()).collect();
        assert_eq!(before, after);
        assert_eq!(sim.bounds().width, 1024.0);
        sim.resize(0.0, 10.0);
        assert_eq!(sim.bounds().width, 1024.0);
    }

    #[test]
    fn explicit_population_rejects_second_player() {
        let config = SimConfig::default();
        let entities = vec![
            Entity::new(Vec2::new(100.0, 100.0), BehaviorSource::Player(PlayerControl), &config),
            Entity::new(Vec2::new(200.0, 100.0), BehaviorSource::Player(PlayerControl), &config),
        ];
        assert!(matches!(
            Simulation::with_entities(config, entities),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn explicit_population_rejects_mismatched_trail_bound() {
        let long_trails = SimConfig {
            trail_length: 50,
            ..SimConfig::default()
        };
        let entities = vec![Entity::new(
            Vec2::new(100.0, 100.0),
            BehaviorSource::Player(PlayerControl),
            &long_trails,
        )];
        let config = SimConfig {
            trail_length: 3,
            ..SimConfig::default()
        };
        assert!(matches!(
            Simulation::with_entities(config, entities),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn explicit_population_with_one_player_is_accepted() {
        let config = SimConfig {
            rng_seed: Some(1),
            ..SimConfig::default()
        };
        let entities = vec![Entity::new(
            Vec2::new(100.0, 100.0),
            BehaviorSource::Player(PlayerControl),
            &config,
        )];
        let mut sim = Simulation::with_entities(config, entities).expect("valid population");
        let input = InputState::new();
        for _ in 0..30 {
            sim.step(&input.snapshot());
        }
        assert_eq!(sim.entities()[0].trail.len(), sim.config().trail_length);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let result = Simulation::new(SimConfig {
            trail_length: 0,
            ..SimConfig::default()
        });
        assert!(result.is_err());
    }
}
