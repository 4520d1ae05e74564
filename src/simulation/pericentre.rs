//! Closest approach of the two galaxies over a finished run

use std::fs;
use std::path::Path;

use crate::error::{SimError, SimResult};
use crate::simulation::params::Units;
use crate::simulation::states::{BodyStore, NVec3};

/// Minimum separation of two saved trajectories and the time it occurs
///
/// Index `i` of either history is the state at `i * dt`, so the returned time
/// is `index * dt` in seconds.
pub fn find_pericentre(a: &[NVec3], b: &[NVec3], dt: f64) -> SimResult<(f64, f64)> {
    if a.len() != b.len() {
        return Err(SimError::HistoryLengthMismatch { left: a.len(), right: b.len() });
    }

    let (index, distance) = a
        .iter()
        .zip(b)
        .map(|(pa, pb)| (pa - pb).norm())
        .enumerate()
        .min_by(|(_, x), (_, y)| x.total_cmp(y))
        .ok_or(SimError::EmptyHistory)?;

    Ok((distance, index as f64 * dt))
}

/// Pericentre summary of a run, in display units
#[derive(Debug, Clone, PartialEq)]
pub struct PericentreReport {
    pub tracers: usize,
    pub bodies: usize,
    pub distance: f64, // distance unit
    pub time: f64, // time unit
}

impl PericentreReport {
    /// Analyse the galaxies at index 0 and 1 of a finished run
    ///
    /// History index 0 is the state at `start_time` (seconds), which is
    /// non-zero for a resumed run.
    pub fn from_run(bodies: &BodyStore, dt: f64, start_time: f64, units: &Units) -> SimResult<Self> {
        bodies.history_len()?;
        let (primary, secondary) = bodies.massive_pair()?;
        let (distance, time) = find_pericentre(&primary.history, &secondary.history, dt)?;
        Ok(Self {
            tracers: bodies.tracer_count(),
            bodies: bodies.len(),
            distance: distance / units.distance,
            time: (start_time + time) / units.time,
        })
    }

    /// Single line: `tracer_count total_body_count min_distance time`
    pub fn to_line(&self) -> String {
        format!("{} {} {} {}", self.tracers, self.bodies, self.distance, self.time)
    }

    pub fn write(&self, path: &Path) -> SimResult<()> {
        fs::write(path, self.to_line() + "\n")
            .map_err(|source| SimError::CheckpointWriteError { path: path.to_path_buf(), source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_index_times_dt() {
        let a = vec![NVec3::zeros(); 4];
        let b = vec![
            NVec3::new(3.0, 0.0, 0.0),
            NVec3::new(2.0, 0.0, 0.0),
            NVec3::new(0.0, 1.0, 0.0),
            NVec3::new(0.0, 0.0, 5.0),
        ];
        let (d, t) = find_pericentre(&a, &b, 0.5).unwrap();
        assert_eq!(d, 1.0);
        assert_eq!(t, 1.0);
    }

    #[test]
    fn first_sample_can_be_the_minimum() {
        let a = vec![NVec3::zeros(); 2];
        let b = vec![NVec3::x(), NVec3::x() * 2.0];
        assert_eq!(find_pericentre(&a, &b, 7.0).unwrap(), (1.0, 0.0));
    }

    #[test]
    fn rejects_bad_histories() {
        assert!(matches!(find_pericentre(&[], &[], 1.0), Err(SimError::EmptyHistory)));
        let a = vec![NVec3::zeros(); 2];
        let b = vec![NVec3::x(); 3];
        assert!(matches!(
            find_pericentre(&a, &b, 1.0),
            Err(SimError::HistoryLengthMismatch { left: 2, right: 3 })
        ));
    }

    #[test]
    fn report_time_counts_from_run_start() {
        use crate::simulation::states::{PRIMARY_NAME, SECONDARY_NAME};

        let mut bodies = BodyStore::new();
        bodies.create(PRIMARY_NAME, 1.0, NVec3::zeros(), NVec3::zeros(), "bo");
        bodies.create(SECONDARY_NAME, 1.0, NVec3::x() * 4.0, NVec3::zeros(), "ro");
        for d in [3.0, 1.0, 2.0] {
            bodies.bodies_mut()[1].x = NVec3::x() * d;
            bodies.record_positions();
        }
        let units = Units {
            distance: 2.0,
            time: 10.0,
            mass: 1.0,
            distance_label: "kpc".into(),
            time_label: "Gyr".into(),
        };

        // minimum at index 1, i.e. 5 s after a run resumed at 20 s
        let report = PericentreReport::from_run(&bodies, 5.0, 20.0, &units).unwrap();
        assert_eq!(report.distance, 0.5);
        assert_eq!(report.time, 2.5);
        assert_eq!(PericentreReport::from_run(&bodies, 5.0, 0.0, &units).unwrap().time, 0.5);
    }

    #[test]
    fn report_line_layout() {
        let report = PericentreReport { tracers: 90, bodies: 92, distance: 12.5, time: 0.75 };
        assert_eq!(report.to_line(), "90 92 12.5 0.75");
    }
}
