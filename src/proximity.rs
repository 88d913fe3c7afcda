use crate::entity::Entity;

/// A link between two connecting entities that are close enough this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    /// Lower entity index.
    pub a: usize,
    /// Higher entity index.
    pub b: usize,
    pub distance_sq: f32,
    /// 1 at zero distance, approaching 0 at the threshold.
    pub strength: f32,
}

/// Per-frame pair scan. Keeps its buffer between frames.
#[derive(Debug, Default, Clone)]
pub struct ProximityGraph {
    links: Vec<Connection>,
}

impl ProximityGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn links(&self) -> &[Connection] {
        &self.links
    }

    /// Find every unordered pair where both sides are connecting and the squared
    /// distance is under `threshold²`.
    pub fn scan(&mut self, entities: &[Entity], threshold: f32) -> &[Connection] {
        self.links.clear();
        let threshold_sq = threshold * threshold;
        for (i, a) in entities.iter().enumerate() {
            if !a.connecting() {
                continue;
            }
            for (offset, b) in entities[i + 1..].iter().enumerate() {
                if !b.connecting() {
                    continue;
                }
                let distance_sq = a.position().distance_squared(b.position());
                if distance_sq < threshold_sq {
                    self.links.push(Connection {
                        a: i,
                        b: i + 1 + offset,
                        distance_sq,
                        strength: 1.0 - distance_sq.sqrt() / threshold,
                    });
                }
            }
        }
        &self.links
    }

    /// Flag linked entities and nudge each one's signal once, whatever its link count.
    pub fn apply_feedback(&self, entities: &mut [Entity], boost: f32, ceiling: f32) {
        for entity in entities.iter_mut() {
            entity.set_connected(false);
        }
        for link in &self.links {
            for index in [link.a, link.b] {
                if let Some(entity) = entities.get_mut(index) {
                    entity.set_connected(true);
                }
            }
        }
        for entity in entities.iter_mut().filter(|e| e.connected()) {
            entity.signal.boost(boost, ceiling);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::{BehaviorSource, PlayerControl};
    use crate::config::SimConfig;
    use crate::vec2::Vec2;

    fn approx_eq(a: f32, b: f32, eps: f32) -> bool {
        (a - b).abs() <= eps
    }

    fn entity_at(x: f32, y: f32, connecting: bool) -> Entity {
        let mut entity = Entity::new(
            Vec2::new(x, y),
            BehaviorSource::Player(PlayerControl),
            &SimConfig::default(),
        );
        entity.signal.connecting = connecting;
        entity
    }

    #[test]
    fn just_inside_threshold_links_with_small_strength() {
        let threshold = 100.0;
        let mut entities = vec![
            entity_at(0.0, 0.0, true),
            entity_at(threshold - 1.0, 0.0, true),
        ];
        let mut graph = ProximityGraph::new();
        let links = graph.scan(&entities, threshold).to_vec();
        assert_eq!(links.len(), 1);
        assert_eq!((links[0].a, links[0].b), (0, 1));
        assert!(approx_eq(links[0].strength, 1.0 / threshold, 1e-5));

        graph.apply_feedback(&mut entities, 0.05, 1.5);
        for entity in &entities {
            assert!(entity.connected());
            assert!(approx_eq(entity.signal_level(), 0.05, 1e-6));
        }
    }

    #[test]
    fn latch_off_never_links_even_when_overlapping() {
        let entities = vec![
            entity_at(10.0, 10.0, true),
            entity_at(10.0, 10.0, false),
            entity_at(11.0, 10.0, false),
        ];
        let mut graph = ProximityGraph::new();
        assert!(graph.scan(&entities, 100.0).is_empty());
    }

    #[test]
    fn exactly_at_threshold_is_not_linked() {
        let entities = vec![entity_at(0.0, 0.0, true), entity_at(60.0, 80.0, true)];
        let mut graph = ProximityGraph::new();
        assert!(graph.scan(&entities, 100.0).is_empty());
    }

    #[test]
    fn coincident_pair_has_full_strength() {
        let entities = vec![entity_at(5.0, 5.0, true), entity_at(5.0, 5.0, true)];
        let mut graph = ProximityGraph::new();
        let links = graph.scan(&entities, 100.0);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].strength, 1.0);
        assert!(links[0].strength.is_finite());
    }

    #[test]
    fn each_unordered_pair_counted_once() {
        let entities: Vec<Entity> = (0..5).map(|i| entity_at(i as f32, 0.0, true)).collect();
        let mut graph = ProximityGraph::new();
        let links = graph.scan(&entities, 100.0);
        assert_eq!(links.len(), 10);
        assert!(links.iter().all(|l| l.a < l.b));
    }

    #[test]
    fn feedback_once_per_frame_and_capped() {
        let mut entities = vec![
            entity_at(0.0, 0.0, true),
            entity_at(1.0, 0.0, true),
            entity_at(2.0, 0.0, true),
            entity_at(500.0, 0.0, true),
        ];
        for entity in &mut entities {
            entity.signal.trigger();
        }
        let mut graph = ProximityGraph::new();
        graph.scan(&entities, 10.0);
        graph.apply_feedback(&mut entities, 0.1, 1.05);
        assert!(approx_eq(entities[1].signal_level(), 1.05, 1e-6));
        assert!(approx_eq(entities[0].signal_level(), 1.05, 1e-6));
        assert_eq!(entities[3].signal_level(), 1.0);
        assert!(!entities[3].connected());
    }
}
