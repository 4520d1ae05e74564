use std::time::Instant;

use crate::error::SimResult;
use crate::simulation::forces::{pair_count, ForceEvaluator, PairwiseGravity};
use crate::simulation::params::G_SI;
use crate::simulation::scenario::ring;
use crate::simulation::states::{BodyStore, NVec3, PRIMARY_NAME, SECONDARY_NAME};

/// Helper to build two galaxies with `rings` tracer rings around the primary
fn make_system(rings: usize) -> BodyStore {
    let mut bodies = BodyStore::new();
    let m = 1.989e41;
    bodies.create(PRIMARY_NAME, m, NVec3::zeros(), NVec3::new(0.0, 75e3, 0.0), "bo");
    bodies.create(SECONDARY_NAME, m, NVec3::new(1.85e21, 7.7e21, 0.0), NVec3::new(0.0, -75e3, 0.0), "ro");

    for k in 1..=rings {
        let radius = k as f64 * 7.7e19;
        ring(&mut bodies, NVec3::zeros(), NVec3::zeros(), G_SI * m, radius, 6 * k, "g.");
    }
    bodies
}

/// Time one force pass for a growing number of rings
/// Paste output directly into a spreadsheet to graph
pub fn bench_forces() -> SimResult<()> {
    println!("rings,bodies,pairs,ms");

    let gravity = PairwiseGravity::new(G_SI);
    for rings in [5, 10, 20, 40, 80, 160] {
        let mut bodies = make_system(rings);
        // Small systems: average over more passes to smooth noise
        let passes = if bodies.len() <= 2000 { 20 } else { 3 };

        // Warm up
        gravity.accumulate_forces(bodies.bodies_mut())?;
        bodies.zero_forces();

        let t0 = Instant::now();
        for _ in 0..passes {
            gravity.accumulate_forces(bodies.bodies_mut())?;
            bodies.zero_forces();
        }
        let ms = t0.elapsed().as_secs_f64() * 1000.0 / passes as f64;

        println!("{},{},{},{:.6}", rings, bodies.len(), pair_count(bodies.bodies()), ms);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn benchmark_system_is_well_formed() {
        let mut bodies = make_system(3);
        assert_eq!(bodies.len(), 2 + 6 + 12 + 18);
        bodies.check_layout().unwrap();
        PairwiseGravity::new(G_SI).accumulate_forces(bodies.bodies_mut()).unwrap();
    }
}
