//! Pairwise Newtonian gravity for galaxies and ring tracers
//!
//! Direct O(n²) summation over unordered pairs, with the tracer rule baked
//! in: tracers feel the galaxies but never pull on anything themselves.

use crate::error::{SimError, SimResult};
use crate::simulation::states::{Body, BodyKind, NVec3};

/// A force law that accumulates onto each body's `force` field
pub trait ForceEvaluator {
    fn accumulate_forces(&self, bodies: &mut [Body]) -> SimResult<()>;
}

/// Direct-sum Newtonian gravity, no softening
#[allow(non_snake_case)]
pub struct PairwiseGravity {
    pub G: f64, // gravitational constant
}

impl PairwiseGravity {
    #[allow(non_snake_case)]
    pub fn new(G: f64) -> Self {
        Self { G }
    }

    /// Force on body `a` due to body `b`
    ///
    /// The magnitude `-G m_a m_b / d²` is resolved through the azimuth
    /// `atan2(ry, rx)` and polar angle `acos(rz / |r|)` of `r = x_a - x_b`,
    /// so the result points from `a` towards `b`.
    pub fn pair_force(&self, a: &Body, b: &Body) -> Option<NVec3> {
        // r is the displacement from b to a
        let r = a.x - b.x;

        // Squared separation |r|^2, undefined force when bodies coincide
        let d2 = r.dot(&r);
        if d2 == 0.0 {
            return None;
        }

        // Attractive, hence negative along +r
        let f = -self.G * a.m * b.m / d2;

        // Spherical angles of r
        let theta = r.y.atan2(r.x);
        let phi = (r.z / d2.sqrt()).clamp(-1.0, 1.0).acos();

        Some(NVec3::new(
            theta.cos() * phi.sin() * f,
            theta.sin() * phi.sin() * f,
            phi.cos() * f,
        ))
    }
}

/// Number of pair evaluations one force pass performs
pub fn pair_count(bodies: &[Body]) -> usize {
    let n = bodies.len();
    let tracers = bodies.iter().filter(|b| b.is_tracer()).count();
    n * n.saturating_sub(1) / 2 - tracers * tracers.saturating_sub(1) / 2
}

impl ForceEvaluator for PairwiseGravity {
    fn accumulate_forces(&self, bodies: &mut [Body]) -> SimResult<()> {
        let n = bodies.len();

        // Loop over each unordered pair (i, j) with i < j, each pair exactly once
        for i in 0..n {
            for j in (i + 1)..n {
                let (kind_i, kind_j) = (bodies[i].kind, bodies[j].kind);

                // Tracers never interact with each other
                if kind_i == BodyKind::Tracer && kind_j == BodyKind::Tracer {
                    continue;
                }

                let f = self
                    .pair_force(&bodies[i], &bodies[j])
                    .ok_or(SimError::DegenerateSeparation { i, j })?;

                // +F on i, -F on j, except that a tracer never reacts back
                // onto the massive body it is paired with
                match (kind_i, kind_j) {
                    (BodyKind::Massive, BodyKind::Massive) => {
                        bodies[i].force += f;
                        bodies[j].force -= f;
                    }
                    (BodyKind::Tracer, BodyKind::Massive) => bodies[i].force += f,
                    (BodyKind::Massive, BodyKind::Tracer) => bodies[j].force -= f,
                    (BodyKind::Tracer, BodyKind::Tracer) => unreachable!(),
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::states::{PRIMARY_NAME, SECONDARY_NAME, TRACER_NAME};

    fn body(name: &str, m: f64, x: [f64; 3]) -> Body {
        Body::new(name, m, NVec3::from(x), NVec3::zeros(), "k.")
    }

    #[test]
    fn pair_force_matches_vector_form() {
        let gravity = PairwiseGravity::new(2.0);
        let a = body(PRIMARY_NAME, 3.0, [1.0, -2.0, 0.5]);
        let b = body(SECONDARY_NAME, 5.0, [-0.5, 1.0, 2.0]);

        let f = gravity.pair_force(&a, &b).unwrap();
        let r = a.x - b.x;
        let expected = -2.0 * 3.0 * 5.0 / r.norm_squared() * r / r.norm();

        assert!((f - expected).norm() < 1e-12 * expected.norm());
    }

    #[test]
    fn pair_count_skips_tracer_pairs() {
        let bodies = vec![
            body(PRIMARY_NAME, 1.0, [0.0, 0.0, 0.0]),
            body(SECONDARY_NAME, 1.0, [1.0, 0.0, 0.0]),
            body(TRACER_NAME, 1.0, [2.0, 0.0, 0.0]),
            body(TRACER_NAME, 1.0, [3.0, 0.0, 0.0]),
            body(TRACER_NAME, 1.0, [4.0, 0.0, 0.0]),
        ];
        // C(5,2) = 10 minus C(3,2) = 3 tracer pairs
        assert_eq!(pair_count(&bodies), 7);
    }

    #[test]
    fn coincident_bodies_fail() {
        let mut bodies = vec![
            body(PRIMARY_NAME, 1.0, [1.0, 1.0, 1.0]),
            body(SECONDARY_NAME, 1.0, [1.0, 1.0, 1.0]),
        ];
        let err = PairwiseGravity::new(1.0).accumulate_forces(&mut bodies).unwrap_err();
        assert!(matches!(err, SimError::DegenerateSeparation { i: 0, j: 1 }));
    }

    #[test]
    fn coincident_tracers_are_never_evaluated() {
        let mut bodies = vec![
            body(PRIMARY_NAME, 1.0, [0.0, 0.0, 0.0]),
            body(SECONDARY_NAME, 1.0, [5.0, 0.0, 0.0]),
            body(TRACER_NAME, 1.0, [1.0, 1.0, 1.0]),
            body(TRACER_NAME, 1.0, [1.0, 1.0, 1.0]),
        ];
        assert!(PairwiseGravity::new(1.0).accumulate_forces(&mut bodies).is_ok());
    }
}
