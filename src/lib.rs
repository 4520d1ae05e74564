pub mod error;
pub mod simulation;
pub mod configuration;
pub mod benchmark;

pub use error::{SimError, SimResult};

pub use simulation::states::{Body, BodyKind, BodyStore, NVec3};
pub use simulation::params::{Parameters, Units};
pub use simulation::clock::{Direction, SimulationClock};
pub use simulation::forces::{ForceEvaluator, PairwiseGravity};
pub use simulation::integrator::{Leapfrog, Phase};
pub use simulation::checkpoint::{rewind, CheckpointSink, CheckpointStore, Snapshot};
pub use simulation::pericentre::{find_pericentre, PericentreReport};
pub use simulation::trajectory::{export_trajectories, frame_indices, write_trajectories, Trajectory};
pub use simulation::scenario::Scenario;

pub use configuration::config::{ScenarioConfig, RunMode, UnitsConfig, ParametersConfig, GalaxyConfig, RingsConfig};

pub use benchmark::benchmark::bench_forces;
