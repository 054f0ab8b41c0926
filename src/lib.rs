//! Event-driven molecular dynamics of hard disks in a periodic box.
//!
//! N identical disks of unit diameter move ballistically in a toroidal 2D
//! box and exchange momentum in elastic collisions. Instead of fixed time
//! steps, the engine advances directly to the next predicted contact: each
//! disk tracks its single nearest predicted collision, the earliest entry
//! wins, and only the predictions the resolved contact made stale are
//! recomputed. Collision impulses feed a virial sum from which the pressure
//! is estimated.
//!
//! The engine is a synchronous single-threaded library. Display, input, and
//! pacing belong to the driver, which may read positions and velocities
//! between steps; the optional `python` feature exposes the same surface as
//! a Python extension module.

pub mod core;
pub mod error;

#[cfg(feature = "python")]
mod python;
