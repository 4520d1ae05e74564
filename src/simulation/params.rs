//! Physical constants and unit scale factors for a run
//!
//! `Parameters` holds everything the integrator needs besides the bodies:
//! - gravitational constant `G` (SI),
//! - the fixed step `dt` in seconds,
//! - `Units` used to scale configuration input and label output,
//! - whether positions are re-centred on the primary after each drift

/// Gravitational constant in SI units
pub const G_SI: f64 = 6.67e-11;
/// One parsec in metres
pub const PARSEC: f64 = 3.086e16;
/// One solar mass in kilograms
pub const SOLAR_MASS: f64 = 1.989e30;
/// One (365 day) year in seconds
pub const YEAR: f64 = 60.0 * 60.0 * 24.0 * 365.0;

/// Scale factors from display units to SI
#[derive(Debug, Clone, PartialEq)]
pub struct Units {
    pub distance: f64, // metres per distance unit
    pub time: f64, // seconds per time unit
    pub mass: f64, // kilograms per mass unit
    pub distance_label: String,
    pub time_label: String,
}

#[allow(non_snake_case)]
#[derive(Debug, Clone)]
pub struct Parameters {
    pub G: f64, // gravitational constant
    pub dt: f64, // step size in seconds
    pub units: Units,
    pub recenter: bool, // translate the primary back to the origin every step
}

impl Parameters {
    #[allow(non_snake_case)]
    pub fn new(G: f64, dt: f64, units: Units) -> Self {
        Self { G, dt, units, recenter: false }
    }
}
