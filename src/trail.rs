use crate::vec2::Vec2;
use std::collections::VecDeque;

/// Newest-first history of recent positions.
#[derive(Debug, Clone, PartialEq)]
pub struct Trail {
    points: VecDeque<Vec2>,
    bound: usize,
}

impl Trail {
    pub fn new(bound: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(bound + 1),
            bound,
        }
    }

    pub fn record(&mut self, position: Vec2) {
        self.points.push_front(position);
        while self.points.len() > self.bound {
            self.points.pop_back();
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn bound(&self) -> usize {
        self.bound
    }

    pub fn newest(&self) -> Option<Vec2> {
        self.points.front().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.points.iter().copied()
    }

    /// Size/opacity factor for the marker at `index`: 1.0 at the head,
    /// approaching zero at the bound.
    pub fn fade(&self, index: usize) -> f32 {
        if index >= self.bound {
            return 0.0;
        }
        1.0 - index as f32 / self.bound as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_oldest_beyond_bound() {
        let mut trail = Trail::new(3);
        for i in 0..5 {
            trail.record(Vec2::new(i as f32, 0.0));
        }
        assert_eq!(trail.len(), 3);
        let xs: Vec<f32> = trail.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![4.0, 3.0, 2.0]);
        assert_eq!(trail.newest(), Some(Vec2::new(4.0, 0.0)));
    }

    #[test]
    fn fade_shrinks_with_index() {
        let trail = Trail::new(4);
        assert_eq!(trail.fade(0), 1.0);
        assert!(trail.fade(1) > trail.fade(2));
        assert_eq!(trail.fade(4), 0.0);
    }
}
