use crate::vec2::Vec2;

/// Point mass shared by every entity.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct KineticBody {
    pub position: Vec2,
    pub velocity: Vec2,
}

impl KineticBody {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
        }
    }

    /// Accelerate, move, then apply friction. The friction step comes last so a
    /// single impulse moves the body by its full pre-friction velocity.
    pub fn integrate(&mut self, accel: Vec2, speed: f32, friction: f32) {
        self.velocity += accel * speed;
        self.position += self.velocity;
        self.velocity *= friction;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_input_at_rest_stays_put() {
        let mut body = KineticBody::at(Vec2::new(12.0, -3.0));
        for _ in 0..10 {
            body.integrate(Vec2::ZERO, 1.0, 0.9);
        }
        assert_eq!(body.position, Vec2::new(12.0, -3.0));
        assert_eq!(body.velocity, Vec2::ZERO);
    }

    #[test]
    fn accelerate_move_decay_order() {
        let mut body = KineticBody::default();
        body.integrate(Vec2::new(1.0, 1.0), 1.0, 0.9);
        assert_eq!(body.velocity, Vec2::new(0.9, 0.9));
        assert_eq!(body.position, Vec2::new(1.0, 1.0));

        // Decaying before moving would leave the body at 0.9 instead.
        let mut reordered = KineticBody::default();
        reordered.velocity += Vec2::new(1.0, 1.0);
        reordered.velocity *= 0.9;
        reordered.position += reordered.velocity;
        assert_ne!(reordered.position, body.position);
    }

    #[test]
    fn coasts_after_input_stops() {
        let mut body = KineticBody::default();
        body.integrate(Vec2::new(1.0, 0.0), 2.0, 0.5);
        body.integrate(Vec2::ZERO, 2.0, 0.5);
        assert_eq!(body.position, Vec2::new(3.0, 0.0));
        assert_eq!(body.velocity, Vec2::new(0.5, 0.0));
    }
}
