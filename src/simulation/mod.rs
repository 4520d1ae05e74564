pub mod states;
pub mod params;
pub mod clock;
pub mod forces;
pub mod integrator;
pub mod checkpoint;
pub mod pericentre;
pub mod trajectory;
pub mod scenario;
