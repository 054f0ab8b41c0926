//! Core data structures of the event-driven hard-disk engine.
//!
//! `disk` holds the particle type, `schedule` the per-disk table of nearest
//! predicted collisions, and `sim` the engine that drives both.

pub mod disk;
pub mod schedule;
pub mod sim;

pub use disk::Disk;
pub use schedule::CollisionSchedule;
pub use sim::{Layout, Simulation};
