//! Software renderer that turns simulation state into RGBA pixels.

use crate::config::RenderStyleKind;
use crate::entity::Entity;
use crate::proximity::Connection;
use crate::sim::Simulation;
use crate::vec2::Vec2;

pub type Rgb = (u8, u8, u8);

/// Borrowed RGBA8 frame buffer with clipped drawing helpers.
pub struct Canvas<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
}

impl<'a> Canvas<'a> {
    pub fn new(frame: &'a mut [u8], width: u32, height: u32) -> Self {
        Self {
            frame,
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let idx = self.index(x as i32, y as i32)?;
        let px = &self.frame[idx..idx + 4];
        Some([px[0], px[1], px[2], px[3]])
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        let idx = ((y as u32 * self.width + x as u32) * 4) as usize;
        (idx + 3 < self.frame.len()).then_some(idx)
    }

    pub fn clear(&mut self, (r, g, b): Rgb) {
        for px in self.frame.chunks_exact_mut(4) {
            px[0] = r;
            px[1] = g;
            px[2] = b;
            px[3] = 255;
        }
    }

    pub fn blend(&mut self, x: i32, y: i32, (r, g, b): Rgb, a: u8) {
        let Some(idx) = self.index(x, y) else {
            return;
        };
        let ar = a as u16;
        let iar = (255 - a) as u16;
        let px = &mut self.frame[idx..idx + 4];
        px[0] = ((r as u16 * ar + px[0] as u16 * iar) / 255) as u8;
        px[1] = ((g as u16 * ar + px[1] as u16 * iar) / 255) as u8;
        px[2] = ((b as u16 * ar + px[2] as u16 * iar) / 255) as u8;
        px[3] = 255;
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Rgb, a: u8) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = x.saturating_add(w).min(self.width as i32);
        let y1 = y.saturating_add(h).min(self.height as i32);
        for py in y0..y1 {
            for px in x0..x1 {
                self.blend(px, py, color, a);
            }
        }
    }

    pub fn stroke_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Rgb, a: u8) {
        if w <= 0 || h <= 0 {
            return;
        }
        let (x2, y2) = (x.saturating_add(w - 1), y.saturating_add(h - 1));
        for px in x..=x2 {
            self.blend(px, y, color, a);
            self.blend(px, y2, color, a);
        }
        for py in y + 1..y2 {
            self.blend(x, py, color, a);
            self.blend(x2, py, color, a);
        }
    }

    pub fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgb, a: u8) {
        if radius <= 0.0 {
            return;
        }
        let r_sq = radius * radius;
        let x0 = (center.x - radius).floor() as i32;
        let x1 = (center.x + radius).ceil() as i32;
        let y0 = ((center.y - radius).floor() as i32).max(0);
        let y1 = ((center.y + radius).ceil() as i32).min(self.height as i32 - 1);
        for py in y0..=y1 {
            for px in x0.max(0)..=x1.min(self.width as i32 - 1) {
                let dx = px as f32 + 0.5 - center.x;
                let dy = py as f32 + 0.5 - center.y;
                if dx * dx + dy * dy <= r_sq {
                    self.blend(px, py, color, a);
                }
            }
        }
    }

    pub fn stroke_circle(&mut self, center: Vec2, radius: f32, color: Rgb, a: u8) {
        let steps = ((radius * RING_STEPS_PER_PIXEL) as usize).clamp(8, 720);
        for i in 0..steps {
            let angle = std::f32::consts::TAU * i as f32 / steps as f32;
            let x = center.x + angle.cos() * radius;
            let y = center.y + angle.sin() * radius;
            self.blend(x.round() as i32, y.round() as i32, color, a);
        }
    }

    /// DDA line from `from` to `to`.
    pub fn line(&mut self, from: Vec2, to: Vec2, color: Rgb, a: u8) {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as usize;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let x = from.x + dx * t;
            let y = from.y + dy * t;
            self.blend(x.round() as i32, y.round() as i32, color, a);
        }
    }

    pub fn text(&mut self, text: &str, x: i32, y: i32, scale: i32, color: Rgb) {
        let mut cx = x;
        for ch in text.chars() {
            if let Some(rows) = glyph_5x7(ch) {
                for (ry, row) in rows.iter().enumerate() {
                    for rx in 0..5 {
                        if (row >> (4 - rx)) & 1 == 1 {
                            self.fill_rect(
                                cx + rx * scale,
                                y + ry as i32 * scale,
                                scale,
                                scale,
                                color,
                                255,
                            );
                        }
                    }
                }
            }
            cx += 6 * scale;
        }
    }
}

const RING_STEPS_PER_PIXEL: f32 = 7.0;

/// How one visual variant draws entities and links. The simulation is shared.
pub trait RenderStyle {
    fn background(&self) -> Rgb;
    fn draw_link(&self, canvas: &mut Canvas<'_>, a: &Entity, b: &Entity, link: &Connection);
    fn draw_entity(&self, canvas: &mut Canvas<'_>, entity: &Entity);
}

fn body_color(entity: &Entity) -> Rgb {
    if entity.is_controlled() {
        (255, 210, 120)
    } else {
        (120, 180, 255)
    }
}

/// Mix toward white by the signal level.
fn flashed(color: Rgb, signal: f32) -> Rgb {
    let t = signal.clamp(0.0, 1.0);
    let mix = |c: u8| (c as f32 + (255.0 - c as f32) * t) as u8;
    (mix(color.0), mix(color.1), mix(color.2))
}

/// Hard-edged square particles with square trail markers.
pub struct SquareParticles {
    pub size: f32,
}

impl Default for SquareParticles {
    fn default() -> Self {
        Self { size: 8.0 }
    }
}

impl RenderStyle for SquareParticles {
    fn background(&self) -> Rgb {
        (20, 20, 30)
    }

    fn draw_link(&self, canvas: &mut Canvas<'_>, a: &Entity, b: &Entity, link: &Connection) {
        let alpha = (link.strength.clamp(0.0, 1.0) * 255.0) as u8;
        canvas.line(a.position(), b.position(), (200, 200, 255), alpha);
    }

    fn draw_entity(&self, canvas: &mut Canvas<'_>, entity: &Entity) {
        let color = body_color(entity);
        for (i, point) in entity.trail.iter().enumerate().skip(1) {
            let fade = entity.trail.fade(i);
            let side = (self.size * fade).max(1.0);
            let half = side * 0.5;
            canvas.fill_rect(
                (point.x - half) as i32,
                (point.y - half) as i32,
                side as i32,
                side as i32,
                color,
                (fade * 120.0) as u8,
            );
        }

        let pos = entity.position();
        let side = self.size * (1.0 + entity.signal_level() * 0.5);
        let half = side * 0.5;
        let (x, y) = ((pos.x - half) as i32, (pos.y - half) as i32);
        canvas.fill_rect(
            x,
            y,
            side as i32,
            side as i32,
            flashed(color, entity.signal_level()),
            255,
        );
        if entity.connecting() {
            canvas.stroke_rect(x - 3, y - 3, side as i32 + 6, side as i32 + 6, (255, 255, 255), 160);
        }
    }
}

/// Soft circles whose radius follows the heartbeat pulse.
pub struct GlowOrbs {
    pub radius: f32,
    pub pulse_strength: f32,
}

impl Default for GlowOrbs {
    fn default() -> Self {
        Self {
            radius: 10.0,
            pulse_strength: 3.0,
        }
    }
}

impl RenderStyle for GlowOrbs {
    fn background(&self) -> Rgb {
        (8, 10, 24)
    }

    fn draw_link(&self, canvas: &mut Canvas<'_>, a: &Entity, b: &Entity, link: &Connection) {
        let alpha = (link.strength.clamp(0.0, 1.0) * 200.0) as u8;
        let mid = (a.position() + b.position()) * 0.5;
        canvas.fill_circle(mid, self.radius * link.strength, (200, 200, 255), alpha / 3);
        canvas.line(a.position(), b.position(), (200, 200, 255), alpha);
    }

    fn draw_entity(&self, canvas: &mut Canvas<'_>, entity: &Entity) {
        let color = body_color(entity);
        for (i, point) in entity.trail.iter().enumerate().skip(1) {
            let fade = entity.trail.fade(i);
            canvas.fill_circle(point, self.radius * 0.5 * fade, color, (fade * 90.0) as u8);
        }

        let pos = entity.position();
        let radius = self.radius + entity.heart.pulse() * self.pulse_strength;
        let signal = entity.signal_level();
        if signal > 0.0 {
            let halo = (signal.min(1.0) * 90.0) as u8;
            canvas.fill_circle(pos, radius * (1.5 + signal), (255, 255, 255), halo);
        }
        let aura = if entity.connected() { 64 } else { 30 };
        canvas.fill_circle(pos, radius * 2.0, color, aura);
        canvas.fill_circle(pos, radius, flashed(color, signal), 230);
        if entity.connecting() {
            canvas.stroke_circle(pos, radius * 2.2, (220, 220, 255), 180);
        }
    }
}

pub fn style_for(kind: RenderStyleKind) -> Box<dyn RenderStyle> {
    match kind {
        RenderStyleKind::Squares => Box::new(SquareParticles::default()),
        RenderStyleKind::Orbs => Box::new(GlowOrbs::default()),
    }
}

/// Draw one full frame: background, links, entities, HUD.
pub fn render(canvas: &mut Canvas<'_>, sim: &Simulation, style: &dyn RenderStyle) {
    canvas.clear(style.background());

    let entities = sim.entities();
    for link in sim.connections() {
        if let (Some(a), Some(b)) = (entities.get(link.a), entities.get(link.b)) {
            style.draw_link(canvas, a, b, link);
        }
    }
    // Player last so it sits on top.
    for entity in entities.iter().filter(|e| !e.is_controlled()) {
        style.draw_entity(canvas, entity);
    }
    if let Some(player) = sim.player() {
        style.draw_entity(canvas, player);
    }

    canvas.fill_rect(8, 8, 300, 56, (0, 0, 0), 140);
    canvas.text(
        &format!("FRAME: {}", sim.clock().frame()),
        16,
        16,
        2,
        (230, 230, 230),
    );
    let hud = match sim.player() {
        Some(player) => format!(
            "LINKS: {}  BPM: {}",
            sim.connections().len(),
            player.heart.rate().round() as i32
        ),
        None => format!("LINKS: {}  ENTITIES: {}", sim.connections().len(), entities.len()),
    };
    canvas.text(&hud, 16, 38, 2, (180, 220, 255));
}

fn glyph_5x7(ch: char) -> Option<[u8; 7]> {
    Some(match ch.to_ascii_uppercase() {
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'B' => [0x1E, 0x11, 0x1E, 0x11, 0x11, 0x11, 0x1E],
        'E' => [0x1F, 0x10, 0x1E, 0x10, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x1E, 0x10, 0x10, 0x10, 0x10],
        'I' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x1F],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x19, 0x15, 0x13, 0x11, 0x11, 0x11],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1E, 0x01, 0x01, 0x0E, 0x01, 0x01, 0x1E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        ':' => [0x00, 0x04, 0x00, 0x00, 0x04, 0x00, 0x00],
        ' ' => [0x00; 7],
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::input::InputState;

    fn buffer(w: u32, h: u32) -> Vec<u8> {
        vec![0; (w * h * 4) as usize]
    }

    #[test]
    fn blend_clips_off_surface() {
        let mut frame = buffer(4, 4);
        let mut canvas = Canvas::new(&mut frame, 4, 4);
        canvas.blend(-1, 0, (255, 0, 0), 255);
        canvas.blend(4, 4, (255, 0, 0), 255);
        canvas.fill_rect(-10, -10, 5, 5, (255, 0, 0), 255);
        assert!(frame.iter().all(|&b| b == 0));
    }

    #[test]
    fn opaque_blend_replaces_pixel() {
        let mut frame = buffer(4, 4);
        let mut canvas = Canvas::new(&mut frame, 4, 4);
        canvas.blend(2, 1, (10, 20, 30), 255);
        assert_eq!(canvas.pixel(2, 1), Some([10, 20, 30, 255]));
        assert_eq!(canvas.pixel(9, 9), None);
    }

    #[test]
    fn circle_covers_its_center() {
        let mut frame = buffer(32, 32);
        let mut canvas = Canvas::new(&mut frame, 32, 32);
        canvas.fill_circle(Vec2::new(16.0, 16.0), 4.0, (0, 255, 0), 255);
        assert_eq!(canvas.pixel(16, 16), Some([0, 255, 0, 255]));
        assert_eq!(canvas.pixel(0, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn line_reaches_both_ends() {
        let mut frame = buffer(16, 16);
        let mut canvas = Canvas::new(&mut frame, 16, 16);
        canvas.line(Vec2::new(1.0, 1.0), Vec2::new(12.0, 7.0), (255, 255, 255), 255);
        assert_eq!(canvas.pixel(1, 1), Some([255, 255, 255, 255]));
        assert_eq!(canvas.pixel(12, 7), Some([255, 255, 255, 255]));
    }

    #[test]
    fn every_style_renders_a_stepped_world() {
        let mut sim = Simulation::new(SimConfig {
            width: 120.0,
            height: 90.0,
            autonomous_count: 6,
            rng_seed: Some(42),
            ..SimConfig::default()
        })
        .expect("valid config");
        let input = InputState::new();
        for _ in 0..30 {
            sim.step(&input.snapshot());
        }
        for kind in [RenderStyleKind::Squares, RenderStyleKind::Orbs] {
            let style = style_for(kind);
            let mut frame = buffer(120, 90);
            let mut canvas = Canvas::new(&mut frame, 120, 90);
            render(&mut canvas, &sim, style.as_ref());
            let bg = style.background();
            assert!(frame.chunks_exact(4).any(|px| (px[0], px[1], px[2]) != bg));
        }
    }
}
