/// Monotonic frame counter plus accumulated simulation time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clock {
    frame: u64,
    time: f32,
    dt: f32,
}

impl Clock {
    pub fn new(dt: f32) -> Self {
        Self {
            frame: 0,
            time: 0.0,
            dt,
        }
    }

    pub fn advance(&mut self) {
        self.frame += 1;
        self.time += self.dt;
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Seconds of simulation time; feeds the heartbeat waveforms.
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }
}
