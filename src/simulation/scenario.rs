//! Build fully-initialized simulation runs from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces a `Scenario`, the
//! explicit simulation context owning:
//! - physical parameters (`Parameters`)
//! - the clock for this run (`SimulationClock`)
//! - the body store (`BodyStore`), galaxies first
//! - the force law (`PairwiseGravity`)
//!
//! The initial condition comes from fresh galaxy/ring generation, from a
//! forward snapshot (resume), or from the final snapshot of a completed
//! forward run (reverse).

use std::f64::consts::PI;
use std::path::PathBuf;

use tracing::info;

use crate::configuration::config::{GalaxyConfig, RunMode, ScenarioConfig};
use crate::error::{SimError, SimResult};
use crate::simulation::checkpoint::{self, CheckpointStore};
use crate::simulation::clock::{Direction, SimulationClock};
use crate::simulation::forces::PairwiseGravity;
use crate::simulation::integrator::Leapfrog;
use crate::simulation::params::{Parameters, Units};
use crate::simulation::pericentre::PericentreReport;
use crate::simulation::states::{BodyStore, NVec3, PRIMARY_NAME, SECONDARY_NAME, TRACER_NAME};

/// Mass given to every tracer; it never acts on another body
pub const TRACER_MASS: f64 = 1.0;

pub struct Scenario {
    pub parameters: Parameters,
    pub clock: SimulationClock,
    pub bodies: BodyStore,
    pub forces: PairwiseGravity,
    pub frames: usize,
    pub output_dir: PathBuf,
    pub resumed: bool, // continuing a forward run from one of its snapshots
}

impl Scenario {
    pub fn build(cfg: &ScenarioConfig) -> SimResult<Self> {
        cfg.validate()?;
        let units = Units::from(&cfg.units);
        let p_cfg = &cfg.parameters;

        let mut parameters = Parameters::new(p_cfg.G, p_cfg.time_step * units.time, units.clone());
        parameters.recenter = p_cfg.recenter;
        let duration = p_cfg.duration * units.time;
        let interval = p_cfg.checkpoint_interval;

        let (bodies, clock) = match cfg.mode {
            RunMode::Fresh => {
                let mut bodies = BodyStore::new();
                create_galaxies(&mut bodies, cfg, &units);
                create_rings(&mut bodies, cfg, &units, parameters.G);
                let clock = SimulationClock::new(parameters.dt, duration, interval, Direction::Forward)?;
                (bodies, clock)
            }
            RunMode::Resume => {
                let forward = CheckpointStore::forward(&cfg.output_dir, units.time);
                let snapshot = match &cfg.resume_from {
                    Some(raw) => {
                        let label = raw
                            .trim()
                            .parse::<f64>()
                            .map_err(|_| SimError::InvalidConfig(format!("bad snapshot label `{raw}`")))?;
                        // "0.2" and "0.20" name the same file
                        let path = forward.path_for(&forward.label(label * units.time));
                        checkpoint::Snapshot { label, path }
                    }
                    None => forward.latest()?,
                };
                let start = snapshot.label * units.time;
                let remaining = duration - start;
                if !(remaining > 0.0) {
                    return Err(SimError::InvalidConfig(format!(
                        "snapshot at {} {} is already past the configured duration",
                        snapshot.label, units.time_label
                    )));
                }
                info!(path = %snapshot.path.display(), "resuming forward run");
                let bodies = checkpoint::read(&snapshot.path)?;
                let clock = SimulationClock::new(parameters.dt, remaining, interval, Direction::Forward)?
                    .starting_at(start);
                (bodies, clock)
            }
            RunMode::Reverse => {
                let forward = CheckpointStore::forward(&cfg.output_dir, units.time);
                let (bodies, snapshot) = checkpoint::rewind(&forward)?;
                info!(path = %snapshot.path.display(), "reversing from final forward snapshot");
                let clock = SimulationClock::new(parameters.dt, duration, interval, Direction::Reversed)?;
                (bodies, clock)
            }
        };
        bodies.check_layout()?;

        Ok(Self {
            forces: PairwiseGravity::new(parameters.G),
            parameters,
            clock,
            bodies,
            frames: p_cfg.frames,
            output_dir: cfg.output_dir.clone(),
            resumed: cfg.mode == RunMode::Resume,
        })
    }

    /// Checkpoint namespace matching this run's direction
    pub fn checkpoint_store(&self) -> CheckpointStore {
        CheckpointStore::new(&self.output_dir, self.clock.direction, self.parameters.units.time)
    }

    /// Integrate to completion and analyse the galaxies' closest approach
    pub fn run(&mut self) -> SimResult<PericentreReport> {
        let mut store = self.checkpoint_store();
        // a forward snapshot already holds half-step velocities
        let mut leapfrog = if self.resumed {
            Leapfrog::resuming(self.clock.clone(), self.parameters.recenter)
        } else {
            Leapfrog::new(self.clock.clone(), self.parameters.recenter)
        };
        leapfrog.run(&mut self.bodies, &self.forces, &mut store)?;
        self.clock = leapfrog.clock().clone();

        let report = PericentreReport::from_run(
            &self.bodies,
            self.parameters.dt,
            self.clock.start_time,
            &self.parameters.units,
        )?;
        info!(
            "Pericentre = {:.2} {} at t = {:.2} {}",
            report.distance,
            self.parameters.units.distance_label,
            report.time,
            self.parameters.units.time_label,
        );
        Ok(report)
    }
}

fn galaxy_state(g: &GalaxyConfig, units: &Units) -> (f64, NVec3, NVec3) {
    (
        g.mass * units.mass,
        NVec3::from(g.position) * units.distance,
        NVec3::from(g.velocity),
    )
}

/// The two galaxy cores, primary first
pub fn create_galaxies(bodies: &mut BodyStore, cfg: &ScenarioConfig, units: &Units) {
    let (m, x, v) = galaxy_state(&cfg.primary, units);
    bodies.create(PRIMARY_NAME, m, x, v, &cfg.primary.display);
    let (m, x, v) = galaxy_state(&cfg.secondary, units);
    bodies.create(SECONDARY_NAME, m, x, v, &cfg.secondary.display);
}

/// Tracer rings around the primary, and the secondary when enabled
///
/// Ring `k` (from 1) sits at radius `k * radius_increment` with
/// `k * innermost_particles` tracers.
#[allow(non_snake_case)]
pub fn create_rings(bodies: &mut BodyStore, cfg: &ScenarioConfig, units: &Units, G: f64) {
    let rings = &cfg.rings;
    let mut hosts = vec![(&cfg.primary, &rings.display)];
    if rings.secondary_rings {
        hosts.push((&cfg.secondary, &rings.secondary_display));
    }

    for (galaxy, display) in hosts {
        let (m, x, v) = galaxy_state(galaxy, units);
        for k in 1..=rings.count {
            let radius = k as f64 * rings.radius_increment * units.distance;
            ring(bodies, x, v, G * m, radius, k * rings.innermost_particles, display);
        }
    }
}

/// One ring of `count` tracers on circular orbits of `radius` around a host
/// at `center` moving with `drift`, where `mu = G * M_host`
pub fn ring(bodies: &mut BodyStore, center: NVec3, drift: NVec3, mu: f64, radius: f64, count: usize, display: &str) {
    let speed = (mu / radius).sqrt();
    for i in 0..count {
        let angle = 2.0 * PI * i as f64 / count as f64;
        let (s, c) = angle.sin_cos();
        let x = center + NVec3::new(radius * c, radius * s, 0.0);
        let v = drift + NVec3::new(speed * s, -speed * c, 0.0);
        bodies.create(TRACER_NAME, TRACER_MASS, x, v, display);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scenario_matches_classic_layout() {
        let cfg = ScenarioConfig::default();
        let scenario = Scenario::build(&cfg).unwrap();

        // 6 + 12 + 18 + 24 + 30 tracers around the primary
        assert_eq!(scenario.bodies.tracer_count(), 90);
        assert_eq!(scenario.bodies.len(), 92);
        assert_eq!(scenario.clock.total_steps, 10_000);
        assert_eq!(scenario.bodies.bodies()[0].name, PRIMARY_NAME);
        assert_eq!(scenario.bodies.bodies()[1].name, SECONDARY_NAME);
    }

    #[test]
    fn secondary_rings_double_the_tracers() {
        let mut cfg = ScenarioConfig::default();
        cfg.rings.secondary_rings = true;
        let scenario = Scenario::build(&cfg).unwrap();
        assert_eq!(scenario.bodies.tracer_count(), 180);
        assert_eq!(scenario.bodies.bodies().last().unwrap().display, "y.");
    }
}
