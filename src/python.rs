use numpy::ndarray::Array2;
use numpy::{IntoPyArray, PyArray2};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::core::disk::DIM;
use crate::core::{Layout, Simulation};

fn py_err<E: ToString>(e: E) -> PyErr {
    PyValueError::new_err(e.to_string())
}

/// Python-facing wrapper around the Rust hard-disk engine.
///
/// API:
/// - __new__(num_disks, box_size, layout="regular", seed=None)
/// - step() / advance_to(time)
/// - get_positions() / get_velocities() -> np.ndarray, shape (N, 2)
/// - pressure(), reset_statistics(), plus scalar accessors
#[pyclass]
pub struct HardDiskSim {
    sim: Simulation,
}

#[pymethods]
impl HardDiskSim {
    /// Initialize a hard-disk gas in a 2D periodic box.
    ///
    /// Parameters
    /// - num_disks: number of disks (int, > 0)
    /// - box_size: iterable of 2 positive floats [Lx, Ly], in disk diameters
    /// - layout: "regular" (triangular lattice) or "random"
    /// - seed: RNG seed (int) for reproducibility; None for nondeterministic
    ///
    /// Errors: raises ValueError on invalid parameters or when random
    /// placement cannot fit the requested density.
    #[new]
    #[pyo3(signature = (num_disks, box_size, layout="regular", seed=None))]
    fn new(num_disks: usize, box_size: Vec<f64>, layout: &str, seed: Option<u64>) -> PyResult<Self> {
        if box_size.len() != DIM {
            return Err(py_err(format!("box_size must have length {DIM}")));
        }
        let mut bs = [0.0_f64; DIM];
        for (k, v) in box_size.iter().enumerate() {
            bs[k] = *v;
        }
        let layout: Layout = layout.parse().map_err(py_err)?;
        let sim = Simulation::new(num_disks, bs, layout, seed).map_err(py_err)?;
        Ok(Self { sim })
    }

    /// Resolve the next collision event (releases the GIL during computation).
    fn step(&mut self, py: Python<'_>) -> PyResult<()> {
        py.detach(|| self.sim.step()).map_err(py_err)
    }

    /// Advance the simulation to the specified absolute time, resolving
    /// every collision on the way (releases the GIL during computation).
    fn advance_to(&mut self, py: Python<'_>, target_time: f64) -> PyResult<()> {
        py.detach(|| self.sim.advance_to(target_time))
            .map_err(py_err)
    }

    /// Return positions as a NumPy array of shape (N, 2), dtype=float64.
    fn get_positions<'py>(&self, py: Python<'py>) -> PyResult<Py<PyArray2<f64>>> {
        let n = self.sim.num_disks();
        let mut arr = Array2::<f64>::zeros((n, DIM));
        for (i, p) in self.sim.disks.iter().enumerate() {
            for k in 0..DIM {
                arr[[i, k]] = p.r[k];
            }
        }
        Ok(arr.into_pyarray(py).unbind())
    }

    /// Return velocities as a NumPy array of shape (N, 2), dtype=float64.
    fn get_velocities<'py>(&self, py: Python<'py>) -> PyResult<Py<PyArray2<f64>>> {
        let n = self.sim.num_disks();
        let mut arr = Array2::<f64>::zeros((n, DIM));
        for (i, p) in self.sim.disks.iter().enumerate() {
            for k in 0..DIM {
                arr[[i, k]] = p.v[k];
            }
        }
        Ok(arr.into_pyarray(py).unbind())
    }

    /// Virial pressure estimate in units of the ideal-gas value.
    ///
    /// Errors: raises ValueError before any simulation time has elapsed.
    fn pressure(&self) -> PyResult<f64> {
        self.sim.pressure().map_err(py_err)
    }

    /// Zero the clock, virial sum, and collision counter; the trajectory
    /// continues unchanged.
    fn reset_statistics(&mut self) {
        self.sim.reset_statistics();
    }

    /// Current simulation time.
    fn time(&self) -> f64 {
        self.sim.time()
    }

    /// Temperature recorded at initialization (half mean squared speed).
    fn temperature(&self) -> f64 {
        self.sim.temperature()
    }

    /// Collisions resolved since the last statistics reset.
    fn collision_count(&self) -> u64 {
        self.sim.collision_count()
    }

    /// Total kinetic energy.
    fn kinetic_energy(&self) -> f64 {
        self.sim.kinetic_energy()
    }

    /// Number of disks.
    fn num_disks(&self) -> usize {
        self.sim.num_disks()
    }

    /// Box edge lengths (Lx, Ly).
    fn box_size(&self) -> (f64, f64) {
        let [lx, ly] = self.sim.box_size();
        (lx, ly)
    }
}

/// The disksim Python module entry point.
#[pymodule]
fn disksim(_py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<HardDiskSim>()?;
    Ok(())
}
