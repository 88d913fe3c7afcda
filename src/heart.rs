use crate::config::HeartConfig;
use std::f32::consts::TAU;

/// Heart rate that climbs with movement, idles on a slow wave, and settles
/// toward a calm rate while linked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Heartbeat {
    rate: f32,
    pulse: f32,
}

impl Heartbeat {
    pub fn new(config: &HeartConfig) -> Self {
        Self {
            rate: config.rest_rate,
            pulse: 0.0,
        }
    }

    /// Beats per minute.
    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Current waveform sample in [-1, 1].
    pub fn pulse(&self) -> f32 {
        self.pulse
    }

    pub fn update(&mut self, moving: bool, connected: bool, time: f32, config: &HeartConfig) {
        if moving {
            self.rate = (self.rate + config.exertion_step).min(config.max_rate);
        } else {
            self.rate = config.rest_rate + (time * config.rest_wave).sin() * config.rest_swing;
        }
        if connected {
            self.rate += (config.calm_rate - self.rate) * config.calm_ease;
        }
        let frequency = self.rate / 60.0;
        self.pulse = (time * frequency * TAU).sin();
    }
}
