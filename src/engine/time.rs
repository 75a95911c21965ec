use std::time::Instant;

pub struct FrameTimer {
    last: Instant,
    pub dt: f32,
}

impl FrameTimer {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
            dt: 0.0,
        }
    }

    pub fn tick(&mut self) {
        let now = Instant::now();
        self.dt = now.duration_since(self.last).as_secs_f32();
        self.last = now;
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// Turns variable frame times into a whole number of fixed simulation steps.
/// Leftover time carries into the next frame.
pub struct FixedStep {
    step: f32,
    accum: f32,
    max_steps: u32,
}

impl FixedStep {
    /// Frames slower than `max_steps` worth of simulation drop the excess
    /// instead of spiralling.
    pub fn new(step: f32, max_steps: u32) -> Self {
        Self {
            step,
            accum: 0.0,
            max_steps,
        }
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    /// Feed one frame's elapsed time; returns how many steps to run.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        self.accum += frame_dt;
        let mut steps = 0;
        while self.accum >= self.step && steps < self.max_steps {
            self.accum -= self.step;
            steps += 1;
        }
        if steps == self.max_steps {
            self.accum = self.accum.min(self.step);
        }
        steps
    }
}
