//! Saved trajectories handed to the plotting side
//!
//! Nothing here renders; it only exposes, per body, the ordered saved
//! positions plus the display tag.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{SimError, SimResult};
use crate::simulation::states::{BodyStore, NVec3};

#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    pub display: String,
    pub points: Vec<NVec3>,
}

pub fn export_trajectories(bodies: &BodyStore) -> Vec<Trajectory> {
    bodies
        .bodies()
        .iter()
        .map(|b| Trajectory { display: b.display.clone(), points: b.history.clone() })
        .collect()
}

/// History indices of the `frames` evenly spaced images of a run, always
/// including the first and last saved step
pub fn frame_indices(history_len: usize, frames: usize) -> Vec<usize> {
    if history_len == 0 {
        return Vec::new();
    }
    let last = history_len - 1;
    let interval = (last / frames.max(1)).max(1);

    let mut indices: Vec<usize> = (0..=last).step_by(interval).collect();
    if indices.last() != Some(&last) {
        indices.push(last);
    }
    indices
}

/// One line per body per saved step: `body display step x y z`
pub fn write_trajectories(bodies: &BodyStore, path: &Path) -> SimResult<()> {
    let write_err = |source| SimError::CheckpointWriteError { path: path.to_path_buf(), source };

    let mut out = BufWriter::new(File::create(path).map_err(write_err)?);
    for (i, b) in bodies.bodies().iter().enumerate() {
        for (step, p) in b.history.iter().enumerate() {
            writeln!(out, "{i} {} {step} {:e} {:e} {:e}", b.display, p.x, p.y, p.z).map_err(write_err)?;
        }
    }
    out.flush().map_err(write_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_cover_both_ends() {
        assert_eq!(frame_indices(11, 10), (0..=10).collect::<Vec<_>>());
        assert_eq!(frame_indices(12, 5), vec![0, 2, 4, 6, 8, 10, 11]);
        assert_eq!(frame_indices(3, 10), vec![0, 1, 2]);
        assert!(frame_indices(0, 10).is_empty());
    }
}
