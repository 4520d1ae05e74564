//! Core state types for the galaxy interaction run
//!
//! - `Body`      one point mass: identity, mass, phase-space state, force
//!               accumulator and the full saved-position history
//! - `BodyKind`  massive galaxy core vs. massless ring tracer
//! - `BodyStore` the ordered, append-only collection of bodies
//!
//! Creation order is significant: index 0 and 1 are always the two galaxies.

use nalgebra::Vector3;

use crate::error::{SimError, SimResult};

pub type NVec3 = Vector3<f64>;

/// Name shared by every tracer particle
pub const TRACER_NAME: &str = "Test";
pub const PRIMARY_NAME: &str = "Primary";
pub const SECONDARY_NAME: &str = "Secondary";

/// Whether a body exerts gravity on others
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Massive,
    Tracer,
}

impl BodyKind {
    pub fn from_name(name: &str) -> Self {
        if name == TRACER_NAME {
            BodyKind::Tracer
        } else {
            BodyKind::Massive
        }
    }
}

#[derive(Debug, Clone)]
pub struct Body {
    pub name: String,
    pub kind: BodyKind,
    pub m: f64, // mass
    pub x: NVec3, // position
    pub v: NVec3, // velocity
    pub force: NVec3, // accumulated force for the current step
    pub display: String, // plot tag, opaque to the engine
    pub history: Vec<NVec3>, // one saved position per step
}

impl Body {
    pub fn new(name: &str, m: f64, x: NVec3, v: NVec3, display: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: BodyKind::from_name(name),
            m,
            x,
            v,
            force: NVec3::zeros(),
            display: display.to_string(),
            history: Vec::new(),
        }
    }

    pub fn is_tracer(&self) -> bool {
        self.kind == BodyKind::Tracer
    }
}

/// Ordered collection of every simulated body
#[derive(Debug, Clone, Default)]
pub struct BodyStore {
    bodies: Vec<Body>,
}

impl BodyStore {
    pub fn new() -> Self {
        Self { bodies: Vec::new() }
    }

    /// Append a body with an empty force accumulator and history, returning its index
    pub fn create(&mut self, name: &str, m: f64, x: NVec3, v: NVec3, display: &str) -> usize {
        self.push(Body::new(name, m, x, v, display))
    }

    pub fn push(&mut self, body: Body) -> usize {
        self.bodies.push(body);
        self.bodies.len() - 1
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn bodies_mut(&mut self) -> &mut [Body] {
        &mut self.bodies
    }

    pub fn tracer_count(&self) -> usize {
        self.bodies.iter().filter(|b| b.is_tracer()).count()
    }

    /// The two galaxies, which must sit at index 0 and 1
    pub fn massive_pair(&self) -> SimResult<(&Body, &Body)> {
        match self.bodies.as_slice() {
            [a, b, ..] if !a.is_tracer() && !b.is_tracer() => Ok((a, b)),
            _ => Err(SimError::InvalidConfig(
                "the first two bodies must be the massive galaxies".into(),
            )),
        }
    }

    /// Exactly two massive bodies, both ahead of every tracer
    pub fn check_layout(&self) -> SimResult<()> {
        self.massive_pair()?;
        let massive = self.bodies.len() - self.tracer_count();
        if massive != 2 {
            return Err(SimError::InvalidConfig(format!(
                "expected exactly 2 massive bodies, found {massive}"
            )));
        }
        Ok(())
    }

    /// Preallocate history so a run of `capacity` saved steps never reallocates
    pub fn reserve_history(&mut self, capacity: usize) {
        for b in self.bodies.iter_mut() {
            let extra = capacity.saturating_sub(b.history.len());
            b.history.reserve_exact(extra);
        }
    }

    /// Save every body's current position, keeping histories in lockstep
    pub fn record_positions(&mut self) {
        for b in self.bodies.iter_mut() {
            b.history.push(b.x);
        }
    }

    pub fn zero_forces(&mut self) {
        for b in self.bodies.iter_mut() {
            b.force = NVec3::zeros();
        }
    }

    /// Translate every position so the primary sits at the origin
    pub fn recenter_on_primary(&mut self) {
        let Some(origin) = self.bodies.first().map(|b| b.x) else {
            return;
        };
        for b in self.bodies.iter_mut() {
            b.x -= origin;
        }
    }

    /// Common history length, or `HistoryLengthMismatch` if any body drifted out of lockstep
    pub fn history_len(&self) -> SimResult<usize> {
        let Some(first) = self.bodies.first() else {
            return Ok(0);
        };
        let len = first.history.len();
        for b in &self.bodies[1..] {
            if b.history.len() != len {
                return Err(SimError::HistoryLengthMismatch { left: len, right: b.history.len() });
            }
        }
        Ok(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_follows_tracer_name() {
        assert_eq!(BodyKind::from_name("Test"), BodyKind::Tracer);
        assert_eq!(BodyKind::from_name("Primary"), BodyKind::Massive);
        assert_eq!(BodyKind::from_name("test"), BodyKind::Massive);
    }

    #[test]
    fn layout_requires_galaxies_first() {
        let mut store = BodyStore::new();
        store.create(TRACER_NAME, 1.0, NVec3::zeros(), NVec3::zeros(), "g.");
        store.create(PRIMARY_NAME, 1.0, NVec3::x(), NVec3::zeros(), "bo");
        store.create(SECONDARY_NAME, 1.0, NVec3::y(), NVec3::zeros(), "ro");
        assert!(store.check_layout().is_err());

        let mut store = BodyStore::new();
        store.create(PRIMARY_NAME, 1.0, NVec3::x(), NVec3::zeros(), "bo");
        store.create(SECONDARY_NAME, 1.0, NVec3::y(), NVec3::zeros(), "ro");
        store.create(TRACER_NAME, 1.0, NVec3::zeros(), NVec3::zeros(), "g.");
        assert!(store.check_layout().is_ok());
        assert_eq!(store.tracer_count(), 1);
    }

    #[test]
    fn histories_stay_in_lockstep() {
        let mut store = BodyStore::new();
        store.create(PRIMARY_NAME, 1.0, NVec3::x(), NVec3::zeros(), "bo");
        store.create(SECONDARY_NAME, 1.0, NVec3::y(), NVec3::zeros(), "ro");
        store.record_positions();
        store.record_positions();
        assert_eq!(store.history_len().unwrap(), 2);

        store.bodies_mut()[1].history.pop();
        assert!(matches!(
            store.history_len(),
            Err(SimError::HistoryLengthMismatch { left: 2, right: 1 })
        ));
    }

    #[test]
    fn recenter_moves_primary_to_origin() {
        let mut store = BodyStore::new();
        store.create(PRIMARY_NAME, 1.0, NVec3::new(1.0, 2.0, 3.0), NVec3::zeros(), "bo");
        store.create(SECONDARY_NAME, 1.0, NVec3::new(4.0, 2.0, 3.0), NVec3::zeros(), "ro");
        store.recenter_on_primary();
        assert_eq!(store.bodies()[0].x, NVec3::zeros());
        assert_eq!(store.bodies()[1].x, NVec3::new(3.0, 0.0, 0.0));
    }
}
