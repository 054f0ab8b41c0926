use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the hard-disk engine.
///
/// Failures surface at `Simulation::new` or propagate immediately to the
/// driver; there is no partial-failure mode inside a step.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration at initialization: bad disk count or box
    /// geometry, or a random layout that could not be placed within the
    /// attempt bound.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// An operation was called in a state that cannot support it
    /// (e.g., `pressure()` before any simulation time has elapsed).
    #[error("precondition violated: {0}")]
    Precondition(String),

    /// The schedule holds no finite prediction, so there is no event to
    /// process. For N >= 2 with relative motion this indicates an
    /// inconsistent schedule rather than a physical state.
    #[error("no collision is predicted for any disk")]
    NoCollision,

    /// Numerical or geometric pathology (e.g., degenerate contact normal).
    #[error("numerical error: {0}")]
    MathError(String),
}
