//! Fixed-step simulation clock
//!
//! Step 1 is the leapfrog kickstart; the run is finished when `step` reaches
//! `total_steps`. History index `k` corresponds to elapsed time `k * dt`.

use crate::error::{SimError, SimResult};

/// Upper bound on steps per run; every step stores one position per body
pub const MAX_STEPS: usize = 100_000_000;

/// Which checkpoint namespace a run writes into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reversed,
}

impl Direction {
    pub fn dir_name(self) -> &'static str {
        match self {
            Direction::Forward => "forward",
            Direction::Reversed => "reversed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimulationClock {
    pub step: usize, // steps completed so far
    pub dt: f64, // seconds
    pub total_steps: usize,
    pub checkpoint_interval: usize, // steps between snapshots
    pub start_time: f64, // seconds, non-zero for resumed runs
    pub direction: Direction,
}

impl SimulationClock {
    pub fn new(dt: f64, duration: f64, checkpoint_interval: usize, direction: Direction) -> SimResult<Self> {
        if !(dt > 0.0) || !dt.is_finite() {
            return Err(SimError::InvalidConfig(format!("time step must be positive, got {dt}")));
        }
        if checkpoint_interval == 0 {
            return Err(SimError::InvalidConfig("checkpoint interval must be at least 1".into()));
        }
        Ok(Self {
            step: 0,
            dt,
            total_steps: Self::steps_for(duration, dt)?,
            checkpoint_interval,
            start_time: 0.0,
            direction,
        })
    }

    pub fn starting_at(mut self, start_time: f64) -> Self {
        self.start_time = start_time;
        self
    }

    /// `ceil(duration / dt)`, ignoring float noise below one part in 1e9
    pub fn steps_for(duration: f64, dt: f64) -> SimResult<usize> {
        if !(duration > 0.0) || !duration.is_finite() {
            return Err(SimError::InvalidConfig(format!("duration must be positive, got {duration}")));
        }
        let ratio = duration / dt;
        let nearest = ratio.round();
        let steps = if (ratio - nearest).abs() <= 1e-9 * nearest.max(1.0) {
            nearest
        } else {
            ratio.ceil()
        };
        if !steps.is_finite() || steps > MAX_STEPS as f64 {
            return Err(SimError::InvalidConfig(format!(
                "duration / time step gives {steps:e} steps, more than the limit of {MAX_STEPS}"
            )));
        }
        Ok((steps as usize).max(1))
    }

    /// Elapsed simulated time in seconds since the start of this run
    pub fn elapsed(&self) -> f64 {
        self.step as f64 * self.dt
    }

    /// Absolute simulated time in seconds
    pub fn time(&self) -> f64 {
        self.start_time + self.elapsed()
    }

    pub fn is_checkpoint_step(&self) -> bool {
        self.step % self.checkpoint_interval == 0
    }

    pub fn is_final_step(&self) -> bool {
        self.step >= self.total_steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_count_rounds_up() {
        assert_eq!(SimulationClock::steps_for(1.0, 0.3).unwrap(), 4);
        assert_eq!(SimulationClock::steps_for(1.0, 0.25).unwrap(), 4);
        assert_eq!(SimulationClock::steps_for(2.0, 0.0002).unwrap(), 10_000);
    }

    #[test]
    fn rejects_bad_clock() {
        assert!(SimulationClock::new(0.0, 1.0, 1, Direction::Forward).is_err());
        assert!(SimulationClock::new(0.1, -1.0, 1, Direction::Forward).is_err());
        assert!(SimulationClock::new(0.1, 1.0, 0, Direction::Forward).is_err());
    }

    #[test]
    fn rejects_unbounded_step_count() {
        assert!(matches!(SimulationClock::steps_for(1e300, 1.0), Err(SimError::InvalidConfig(_))));
        assert!(SimulationClock::new(1e-300, 1.0, 1, Direction::Forward).is_err());
        assert_eq!(SimulationClock::steps_for(MAX_STEPS as f64, 1.0).unwrap(), MAX_STEPS);
    }
}
