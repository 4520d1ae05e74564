//! Configuration types for loading galaxy interaction scenarios from YAML.
//!
//! A scenario consists of:
//!
//! - [`UnitsConfig`]      – scale factors from display units to SI
//! - [`ParametersConfig`] – step size, duration, checkpointing and G
//! - [`GalaxyConfig`]     – initial state of the primary and secondary galaxy
//! - [`RingsConfig`]      – tracer rings placed around the galaxies
//! - [`ScenarioConfig`]   – top-level wrapper, plus the run mode
//!
//! Every section has defaults reproducing the classic run (two 1e11 solar
//! mass galaxies, five rings around the primary), so an empty file is valid.
//!
//! # YAML format
//!
//! ```yaml
//! units:
//!   distance: 3.086e19      # metres per distance unit (kpc)
//!   time: 3.1536e16         # seconds per time unit (Gyr)
//!   mass: 1.989e30          # kilograms per mass unit (solar mass)
//!   distance_label: kpc
//!   time_label: Gyr
//!
//! parameters:
//!   G: 6.67e-11             # gravitational constant, SI
//!   time_step: 0.0002       # time units
//!   duration: 2.0           # time units
//!   checkpoint_interval: 1000 # steps
//!   frames: 10              # images handed to the plotter
//!   recenter: false         # keep the primary at the origin
//!
//! primary:
//!   mass: 1.0e11            # mass units
//!   position: [0.0, 0.0, 0.0]   # distance units
//!   velocity: [0.0, 75.0e3, 0.0] # m/s
//!   display: "bo"
//!
//! secondary:
//!   mass: 1.0e11
//!   position: [60.0, 250.0, 0.0]
//!   velocity: [0.0, -75.0e3, 0.0]
//!   display: "ro"
//!
//! rings:
//!   count: 5
//!   innermost_particles: 6
//!   radius_increment: 2.5   # distance units
//!   secondary_rings: false
//!
//! mode: fresh               # fresh | resume | reverse
//! resume_from: null         # snapshot label for resume, latest when absent
//! output_dir: output
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{SimError, SimResult};
use crate::simulation::params::{Units, G_SI, PARSEC, SOLAR_MASS, YEAR};

/// Where the initial condition comes from
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Generate galaxies and rings from this file
    #[default]
    Fresh,
    /// Continue a forward run from one of its snapshots
    Resume,
    /// Seed a reversed-time run from the final snapshot of a finished forward run
    Reverse,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct UnitsConfig {
    pub distance: f64,
    pub time: f64,
    pub mass: f64,
    pub distance_label: String,
    pub time_label: String,
}

impl Default for UnitsConfig {
    fn default() -> Self {
        Self {
            distance: 1e3 * PARSEC,
            time: 1e9 * YEAR,
            mass: SOLAR_MASS,
            distance_label: "kpc".into(),
            time_label: "Gyr".into(),
        }
    }
}

impl From<&UnitsConfig> for Units {
    fn from(cfg: &UnitsConfig) -> Self {
        Units {
            distance: cfg.distance,
            time: cfg.time,
            mass: cfg.mass,
            distance_label: cfg.distance_label.clone(),
            time_label: cfg.time_label.clone(),
        }
    }
}

#[allow(non_snake_case)]
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ParametersConfig {
    pub G: f64,                     // gravitational constant, SI
    pub time_step: f64,             // time units
    pub duration: f64,              // time units
    pub checkpoint_interval: usize, // steps between snapshots
    pub frames: usize,              // images handed to the plotter
    pub recenter: bool,             // keep the primary at the origin
}

impl Default for ParametersConfig {
    fn default() -> Self {
        Self {
            G: G_SI,
            time_step: 2e-4,
            duration: 2.0,
            checkpoint_interval: 1000,
            frames: 10,
            recenter: false,
        }
    }
}

/// Initial state of one galaxy core
#[derive(Deserialize, Debug, Clone)]
pub struct GalaxyConfig {
    pub mass: f64,          // mass units
    pub position: [f64; 3], // distance units
    pub velocity: [f64; 3], // m/s
    pub display: String,
}

impl GalaxyConfig {
    fn primary() -> Self {
        Self { mass: 1e11, position: [0.0; 3], velocity: [0.0, 75e3, 0.0], display: "bo".into() }
    }

    fn secondary() -> Self {
        Self {
            mass: 1e11,
            position: [60.0, 250.0, 0.0],
            velocity: [0.0, -75e3, 0.0],
            display: "ro".into(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct RingsConfig {
    pub count: usize,               // rings per galaxy
    pub innermost_particles: usize, // ring k holds k times this many tracers
    pub radius_increment: f64,      // distance units, ring k sits at k times this
    pub secondary_rings: bool,      // also ring the secondary galaxy
    pub display: String,
    pub secondary_display: String,
}

impl Default for RingsConfig {
    fn default() -> Self {
        Self {
            count: 5,
            innermost_particles: 6,
            radius_increment: 2.5,
            secondary_rings: false,
            display: "g.".into(),
            secondary_display: "y.".into(),
        }
    }
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ScenarioConfig {
    pub units: UnitsConfig,
    pub parameters: ParametersConfig,
    pub primary: GalaxyConfig,
    pub secondary: GalaxyConfig,
    pub rings: RingsConfig,
    pub mode: RunMode,
    pub resume_from: Option<String>,
    pub output_dir: PathBuf,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            units: UnitsConfig::default(),
            parameters: ParametersConfig::default(),
            primary: GalaxyConfig::primary(),
            secondary: GalaxyConfig::secondary(),
            rings: RingsConfig::default(),
            mode: RunMode::Fresh,
            resume_from: None,
            output_dir: PathBuf::from("output"),
        }
    }
}

impl ScenarioConfig {
    pub fn from_yaml(text: &str) -> SimResult<Self> {
        let cfg: ScenarioConfig =
            serde_yaml::from_str(text).map_err(|e| SimError::InvalidConfig(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> SimResult<Self> {
        let file = File::open(path)
            .map_err(|e| SimError::InvalidConfig(format!("{}: {e}", path.display())))?;
        let cfg: ScenarioConfig = serde_yaml::from_reader(BufReader::new(file))
            .map_err(|e| SimError::InvalidConfig(format!("{}: {e}", path.display())))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> SimResult<()> {
        let invalid = |msg: String| Err(SimError::InvalidConfig(msg));
        let p = &self.parameters;

        if !(p.time_step > 0.0) {
            return invalid(format!("time_step must be positive, got {}", p.time_step));
        }
        if !(p.duration > 0.0) {
            return invalid(format!("duration must be positive, got {}", p.duration));
        }
        if p.checkpoint_interval == 0 {
            return invalid("checkpoint_interval must be at least 1".into());
        }
        if !(p.G > 0.0) {
            return invalid(format!("G must be positive, got {}", p.G));
        }
        for (name, u) in [("distance", self.units.distance), ("time", self.units.time), ("mass", self.units.mass)] {
            if !(u > 0.0) {
                return invalid(format!("{name} unit must be positive, got {u}"));
            }
        }
        for (name, g) in [("primary", &self.primary), ("secondary", &self.secondary)] {
            if !(g.mass > 0.0) {
                return invalid(format!("{name} mass must be positive, got {}", g.mass));
            }
        }
        if self.rings.count > 0 && !(self.rings.radius_increment > 0.0) {
            return invalid("ring radius_increment must be positive".into());
        }

        let tags = [
            &self.primary.display,
            &self.secondary.display,
            &self.rings.display,
            &self.rings.secondary_display,
        ];
        for tag in tags {
            if tag.is_empty() || tag.contains(char::is_whitespace) {
                return invalid(format!("display tag `{tag}` must be a single non-empty word"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let cfg = ScenarioConfig::from_yaml("{}").unwrap();
        assert_eq!(cfg.mode, RunMode::Fresh);
        assert_eq!(cfg.rings.count, 5);
        assert_eq!(cfg.parameters.checkpoint_interval, 1000);
    }

    #[test]
    fn partial_sections_merge_with_defaults() {
        let cfg = ScenarioConfig::from_yaml(
            "parameters:\n  time_step: 0.001\nrings:\n  secondary_rings: true\nmode: reverse\n",
        )
        .unwrap();
        assert_eq!(cfg.parameters.time_step, 0.001);
        assert_eq!(cfg.parameters.duration, 2.0);
        assert!(cfg.rings.secondary_rings);
        assert_eq!(cfg.mode, RunMode::Reverse);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(ScenarioConfig::from_yaml("parameters:\n  time_step: 0.0\n").is_err());
        assert!(ScenarioConfig::from_yaml("parameters:\n  checkpoint_interval: 0\n").is_err());
        assert!(ScenarioConfig::from_yaml(
            "primary:\n  mass: 1.0\n  position: [0, 0, 0]\n  velocity: [0, 0, 0]\n  display: \"b o\"\n"
        )
        .is_err());
    }
}
