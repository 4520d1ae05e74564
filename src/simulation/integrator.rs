//! Kick-drift-kick leapfrog with a single half-step kickstart
//!
//! The integrator is a small state machine:
//!
//! ```text
//! Uninitialized -> Kickstarted -> Stepping -> Done
//! ```
//!
//! The first call applies a half-step velocity kick followed by a full drift,
//! every later call a full kick and a full drift. The half kick happens exactly
//! once per run; that is what keeps the scheme time-symmetric.
//!
//! A run resumed from a forward checkpoint already carries half-step
//! velocities, so `Leapfrog::resuming` starts in `Kickstarted` and only ever
//! applies full kicks.

use tracing::{debug, info};

use super::checkpoint::CheckpointSink;
use super::clock::SimulationClock;
use super::forces::ForceEvaluator;
use super::states::BodyStore;
use crate::error::SimResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Kickstarted,
    Stepping,
    Done,
}

#[derive(Debug, Clone)]
pub struct Leapfrog {
    clock: SimulationClock,
    phase: Phase,
    recenter: bool, // translate the primary to the origin after each drift
    last_snapshot_step: Option<usize>,
    origin_pending: bool, // resumed run has not yet recorded its starting positions
}

impl Leapfrog {
    pub fn new(clock: SimulationClock, recenter: bool) -> Self {
        Self {
            clock,
            phase: Phase::Uninitialized,
            recenter,
            last_snapshot_step: None,
            origin_pending: false,
        }
    }

    /// Continue a forward run from a checkpoint whose velocities are already
    /// offset by half a step
    ///
    /// No half kick is applied and the source snapshot is never rewritten:
    /// the first snapshot is taken at the next interval boundary.
    pub fn resuming(mut clock: SimulationClock, recenter: bool) -> Self {
        clock.step = 0;
        Self {
            clock,
            phase: Phase::Kickstarted,
            recenter,
            last_snapshot_step: None,
            origin_pending: true,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    /// Perform one integration step and return the phase reached
    ///
    /// Calling `advance` after `Done` is a no-op.
    pub fn advance(
        &mut self,
        bodies: &mut BodyStore,
        forces: &dyn ForceEvaluator,
        sink: &mut dyn CheckpointSink,
    ) -> SimResult<Phase> {
        let dt = self.clock.dt;

        match self.phase {
            Phase::Done => return Ok(Phase::Done),
            Phase::Uninitialized => {
                sink.begin_run()?;
                bodies.reserve_history(self.clock.total_steps + 1);
                // history index 0 is the initial condition
                bodies.record_positions();

                // v_1/2 = v_0 + (dt/2) a_0, x_1 = x_0 + dt v_1/2
                self.kick_drift(bodies, forces, 0.5 * dt)?;
                self.clock.step = 1;

                info!(bodies = bodies.len(), steps = self.clock.total_steps, "leapfrog kickstart");
                self.snapshot(bodies, sink, self.clock.start_time)?;
                self.phase = Phase::Kickstarted;
            }
            Phase::Kickstarted | Phase::Stepping => {
                if self.origin_pending {
                    sink.begin_run()?;
                    bodies.reserve_history(self.clock.total_steps + 1);
                    bodies.record_positions();
                    self.origin_pending = false;
                    info!(bodies = bodies.len(), steps = self.clock.total_steps, "leapfrog resumed");
                }

                // v_i+3/2 = v_i+1/2 + dt a_i+1, x_i+2 = x_i+1 + dt v_i+3/2
                self.kick_drift(bodies, forces, dt)?;
                self.clock.step += 1;

                if self.clock.is_checkpoint_step() {
                    self.snapshot(bodies, sink, self.clock.time())?;
                }
                self.phase = Phase::Stepping;
                self.log_progress();
            }
        }

        if self.clock.is_final_step() {
            self.finish(bodies, sink)?;
        }
        Ok(self.phase)
    }

    /// Step until `Done`
    pub fn run(
        &mut self,
        bodies: &mut BodyStore,
        forces: &dyn ForceEvaluator,
        sink: &mut dyn CheckpointSink,
    ) -> SimResult<()> {
        while self.advance(bodies, forces, sink)? != Phase::Done {}
        Ok(())
    }

    fn kick_drift(&self, bodies: &mut BodyStore, forces: &dyn ForceEvaluator, kick_dt: f64) -> SimResult<()> {
        let dt = self.clock.dt;
        forces.accumulate_forces(bodies.bodies_mut())?;

        for b in bodies.bodies_mut() {
            // Kick with the force from the current positions
            b.v += (b.force / b.m) * kick_dt;
            // Drift a full step with the updated velocity
            b.x += b.v * dt;
        }
        if self.recenter {
            bodies.recenter_on_primary();
        }

        bodies.zero_forces();
        bodies.record_positions();
        Ok(())
    }

    fn snapshot(&mut self, bodies: &BodyStore, sink: &mut dyn CheckpointSink, time: f64) -> SimResult<()> {
        sink.write(bodies.bodies(), time)?;
        self.last_snapshot_step = Some(self.clock.step);
        Ok(())
    }

    fn finish(&mut self, bodies: &BodyStore, sink: &mut dyn CheckpointSink) -> SimResult<()> {
        let time = self.clock.time();
        // The kickstart snapshot carries the start label, so a one-step run still
        // needs its final snapshot here
        let already_written = self.phase == Phase::Stepping && self.last_snapshot_step == Some(self.clock.step);
        if !already_written {
            self.snapshot(bodies, sink, time)?;
        }
        sink.mark_complete(time)?;
        self.phase = Phase::Done;
        info!(steps = self.clock.step, time, "run complete");
        Ok(())
    }

    fn log_progress(&self) {
        let total = self.clock.total_steps;
        let step = self.clock.step;
        if total >= 10 && step * 10 / total != (step - 1) * 10 / total {
            info!(percent = step * 100 / total, "progress");
        } else {
            debug!(step, "step");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::checkpoint::CheckpointSink;
    use crate::simulation::clock::Direction;
    use crate::simulation::forces::PairwiseGravity;
    use crate::simulation::states::{Body, NVec3, PRIMARY_NAME, SECONDARY_NAME};

    #[derive(Default)]
    struct Recorder {
        times: Vec<f64>,
        completed: Option<f64>,
    }

    impl CheckpointSink for Recorder {
        fn write(&mut self, _bodies: &[Body], time: f64) -> SimResult<()> {
            self.times.push(time);
            Ok(())
        }

        fn mark_complete(&mut self, time: f64) -> SimResult<()> {
            self.completed = Some(time);
            Ok(())
        }
    }

    fn pair() -> BodyStore {
        let mut store = BodyStore::new();
        store.create(PRIMARY_NAME, 1.0, NVec3::new(-1.0, 0.0, 0.0), NVec3::zeros(), "bo");
        store.create(SECONDARY_NAME, 1.0, NVec3::new(1.0, 0.0, 0.0), NVec3::zeros(), "ro");
        store
    }

    #[test]
    fn phases_advance_in_order() {
        let clock = SimulationClock::new(0.01, 0.03, 10, Direction::Forward).unwrap();
        let mut lf = Leapfrog::new(clock, false);
        let mut bodies = pair();
        let gravity = PairwiseGravity::new(1.0);
        let mut sink = Recorder::default();

        assert_eq!(lf.phase(), Phase::Uninitialized);
        assert_eq!(lf.advance(&mut bodies, &gravity, &mut sink).unwrap(), Phase::Kickstarted);
        assert_eq!(lf.advance(&mut bodies, &gravity, &mut sink).unwrap(), Phase::Stepping);
        assert_eq!(lf.advance(&mut bodies, &gravity, &mut sink).unwrap(), Phase::Done);
        assert_eq!(lf.advance(&mut bodies, &gravity, &mut sink).unwrap(), Phase::Done);
        assert_eq!(lf.clock().step, 3);
        assert_eq!(bodies.history_len().unwrap(), 4);
    }

    #[test]
    fn kickstart_applies_half_kick() {
        let dt = 0.1;
        let clock = SimulationClock::new(dt, 1.0, 100, Direction::Forward).unwrap();
        let mut lf = Leapfrog::new(clock, false);
        let mut bodies = pair();
        let gravity = PairwiseGravity::new(1.0);
        let mut sink = Recorder::default();

        lf.advance(&mut bodies, &gravity, &mut sink).unwrap();

        // |F| = G m m / d^2 = 1/4, towards the other body
        let v0 = bodies.bodies()[0].v;
        assert!((v0.x - 0.25 * 0.5 * dt).abs() < 1e-15);
        assert!((bodies.bodies()[0].x.x - (-1.0 + v0.x * dt)).abs() < 1e-15);
        assert_eq!(bodies.bodies()[0].force, NVec3::zeros());
    }

    #[test]
    fn resumed_run_matches_uninterrupted_run() {
        let gravity = PairwiseGravity::new(1.0);
        let clock = SimulationClock::new(0.1, 1.0, 100, Direction::Forward).unwrap();

        let mut whole = pair();
        Leapfrog::new(clock.clone(), false).run(&mut whole, &gravity, &mut Recorder::default()).unwrap();

        // stop after 4 steps, then continue from that state for the remaining 6
        let mut first = pair();
        let mut lf = Leapfrog::new(clock, false);
        for _ in 0..4 {
            lf.advance(&mut first, &gravity, &mut Recorder::default()).unwrap();
        }
        let mut resumed = BodyStore::new();
        for b in first.bodies() {
            resumed.create(&b.name, b.m, b.x, b.v, &b.display);
        }
        let rest = SimulationClock::new(0.1, 0.6, 100, Direction::Forward).unwrap().starting_at(0.4);
        let mut sink = Recorder::default();
        let mut lf = Leapfrog::resuming(rest, false);
        assert_eq!(lf.phase(), Phase::Kickstarted);
        lf.run(&mut resumed, &gravity, &mut sink).unwrap();

        for (a, b) in resumed.bodies().iter().zip(whole.bodies()) {
            assert!((a.x - b.x).norm() < 1e-12, "resume diverged: {:?} vs {:?}", a.x, b.x);
            assert!((a.v - b.v).norm() < 1e-12);
        }
        assert_eq!(resumed.history_len().unwrap(), 7);
        // only the final snapshot, never the 0.4 source label
        assert_eq!(sink.times.len(), 1);
        assert!((sink.times[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn one_step_run_writes_kickstart_and_final_snapshots() {
        let clock = SimulationClock::new(0.5, 0.5, 1, Direction::Forward).unwrap();
        let mut lf = Leapfrog::new(clock, false);
        let mut bodies = pair();
        let mut sink = Recorder::default();

        lf.run(&mut bodies, &PairwiseGravity::new(1.0), &mut sink).unwrap();
        assert_eq!(sink.times, vec![0.0, 0.5]);
        assert_eq!(sink.completed, Some(0.5));
    }
}
