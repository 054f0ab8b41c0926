use crate::core::disk::{Disk, DIAMETER, DIM};
use crate::core::schedule::CollisionSchedule;
use crate::error::{Error, Result};
use rand::{rng, rngs::StdRng, Rng, SeedableRng};

/// Small numeric tolerance for time and geometric checks.
const EPS_TIME: f64 = 1e-12;

/// Bound on rejection-sampling attempts per disk for `Layout::Random`.
/// Exhausting it means the requested density is too high for random
/// placement; the constructor fails instead of looping forever.
const MAX_PLACEMENT_ATTEMPTS: usize = 1_000_000;

/// Initial arrangement of the disks in the box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Triangular lattice fill (deterministic, densest at a given count).
    Regular,
    /// Rejection sampling against all previously placed disks.
    Random,
}

impl std::str::FromStr for Layout {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "regular" => Ok(Layout::Regular),
            "random" => Ok(Layout::Random),
            other => Err(Error::Configuration(format!(
                "unknown layout {other:?}; expected \"regular\" or \"random\""
            ))),
        }
    }
}

/// Event-driven simulation of hard disks in a 2D periodic box.
///
/// The box is toroidal in both axes: a disk leaving one edge re-enters at
/// the opposite edge, and a disk's nearest collision partner may sit across
/// an edge, so pair geometry always considers the 3x3 periodic images.
/// Time advances from collision to collision rather than by fixed steps;
/// between events every disk moves ballistically.
#[derive(Debug)]
pub struct Simulation {
    time_now: f64,
    box_size: [f64; DIM],
    pub disks: Vec<Disk>,
    schedule: CollisionSchedule,
    temperature: f64,
    virial: f64,
    collisions: u64,
}

impl Simulation {
    /// Create a simulation of `num_disks` unit-diameter disks in a periodic
    /// box with edge lengths `box_size`, arranged per `layout`.
    ///
    /// Velocities are sampled uniformly in [-1, 1) per axis and shifted so
    /// the total momentum is exactly zero; the resulting half mean squared
    /// speed is recorded as the temperature. The full pairwise collision
    /// table is built before returning.
    ///
    /// Errors with `Error::Configuration` on `num_disks == 0`, non-finite
    /// or sub-diameter box sides, a lattice too dense to be overlap-free,
    /// or random placement exhausting its attempt bound.
    pub fn new(
        num_disks: usize,
        box_size: [f64; DIM],
        layout: Layout,
        seed: Option<u64>,
    ) -> Result<Self> {
        if num_disks == 0 {
            return Err(Error::Configuration("num_disks must be > 0".into()));
        }
        if !box_size.iter().all(|&l| l.is_finite() && l > 0.0) {
            return Err(Error::Configuration(
                "box_size components must be finite and > 0".into(),
            ));
        }
        for &l in &box_size {
            if l < DIAMETER {
                return Err(Error::Configuration(
                    "box_size must be at least one disk diameter in every dimension".into(),
                ));
            }
        }

        let mut rng: StdRng = match seed {
            Some(s) => SeedableRng::seed_from_u64(s),
            None => SeedableRng::seed_from_u64(rng().random()),
        };

        let positions = match layout {
            Layout::Regular => regular_positions(num_disks, box_size)?,
            Layout::Random => random_positions(num_disks, box_size, &mut rng)?,
        };

        // Uniform velocities with the center-of-mass drift removed, so the
        // total momentum starts at exactly zero.
        let mut velocities = vec![[0.0_f64; DIM]; num_disks];
        for v in &mut velocities {
            for v_k in v.iter_mut() {
                *v_k = rng.random_range(-1.0..1.0);
            }
        }
        let mut mean = [0.0_f64; DIM];
        for v in &velocities {
            for (m, &v_k) in mean.iter_mut().zip(v) {
                *m += v_k;
            }
        }
        for m in &mut mean {
            *m /= num_disks as f64;
        }
        for v in &mut velocities {
            for (v_k, &m) in v.iter_mut().zip(&mean) {
                *v_k -= m;
            }
        }

        let mut disks = Vec::with_capacity(num_disks);
        for (id, (r, v)) in positions.into_iter().zip(velocities).enumerate() {
            disks.push(Disk::new(id as u32, r, v)?);
        }

        let mut sim = Self {
            time_now: 0.0,
            box_size,
            disks,
            schedule: CollisionSchedule::new(num_disks),
            temperature: 0.0,
            virial: 0.0,
            collisions: 0,
        };
        sim.rebuild_schedule();
        Ok(sim)
    }

    /// Current simulation time.
    pub fn time(&self) -> f64 {
        self.time_now
    }

    /// Number of disks.
    pub fn num_disks(&self) -> usize {
        self.disks.len()
    }

    /// Box edge lengths `[Lx, Ly]`.
    pub fn box_size(&self) -> [f64; DIM] {
        self.box_size
    }

    /// Temperature recorded at initialization (half mean squared speed).
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Number of collisions resolved since the last statistics reset.
    pub fn collision_count(&self) -> u64 {
        self.collisions
    }

    /// Positions as a Vec of fixed-size arrays.
    pub fn positions(&self) -> Vec<[f64; DIM]> {
        self.disks.iter().map(|p| p.r).collect()
    }

    /// Velocities as a Vec of fixed-size arrays.
    pub fn velocities(&self) -> Vec<[f64; DIM]> {
        self.disks.iter().map(|p| p.v).collect()
    }

    /// Total kinetic energy (diagnostic; conserved across collisions).
    pub fn kinetic_energy(&self) -> f64 {
        self.disks.iter().map(|p| p.kinetic_energy()).sum()
    }

    /// Total momentum (diagnostic; stays at its initial zero).
    pub fn total_momentum(&self) -> [f64; DIM] {
        let mut sum = [0.0_f64; DIM];
        for p in &self.disks {
            for (s, &v_k) in sum.iter_mut().zip(&p.v) {
                *s += v_k;
            }
        }
        sum
    }

    /// Advance to the next collision and resolve it: one event per call.
    ///
    /// Scans the schedule for the earliest predicted contact, free-flies
    /// every disk to that instant, reflects the normal velocity component
    /// of the colliding pair, refreshes the predictions the contact made
    /// stale, and increments the collision counter. Kinetic energy and
    /// momentum are conserved to floating precision.
    ///
    /// Errors with `Error::NoCollision` when nothing is predicted (for a
    /// single disk, or all relative velocities zero).
    pub fn step(&mut self) -> Result<()> {
        let (collider, dt) = self.schedule.next_event().ok_or(Error::NoCollision)?;
        self.collide(collider, dt)
    }

    /// Advance to `target_time`, resolving every collision on the way and
    /// free-flying through the remainder of the interval.
    pub fn advance_to(&mut self, target_time: f64) -> Result<()> {
        if !target_time.is_finite() {
            return Err(Error::Precondition("target_time must be finite".into()));
        }
        if target_time < self.time_now - EPS_TIME {
            return Err(Error::Precondition(
                "target_time cannot be earlier than current time".into(),
            ));
        }
        while self.time_now + EPS_TIME < target_time {
            let remaining = target_time - self.time_now;
            match self.schedule.next_event() {
                Some((collider, dt)) if dt <= remaining => self.collide(collider, dt)?,
                _ => {
                    // No contact inside the window: coast to the target.
                    self.advance_free_flight(remaining);
                    break;
                }
            }
        }
        Ok(())
    }

    /// Virial pressure estimate in units of the ideal-gas value:
    /// `P V / (N T) = 1 + virial / (2 t N T)`.
    ///
    /// Requires elapsed simulation time (and a nonzero temperature, which
    /// only a single-disk system lacks); both are reported as
    /// `Error::Precondition` rather than returned as NaN.
    pub fn pressure(&self) -> Result<f64> {
        if self.time_now <= 0.0 {
            return Err(Error::Precondition(
                "pressure requires elapsed simulation time".into(),
            ));
        }
        if self.temperature <= 0.0 {
            return Err(Error::Precondition(
                "pressure requires a nonzero temperature".into(),
            ));
        }
        let n = self.disks.len() as f64;
        Ok(1.0 + self.virial / (2.0 * self.time_now * n * self.temperature))
    }

    /// Zero the clock, the virial sum, and the collision counter.
    ///
    /// Positions, velocities, and the collision table are untouched; the
    /// table stores times relative to the present, so the trajectory
    /// continues unchanged and only the averaging window restarts. Used to
    /// discard equilibration transients. Idempotent.
    pub fn reset_statistics(&mut self) {
        self.time_now = 0.0;
        self.virial = 0.0;
        self.collisions = 0;
    }

    /// Recompute the temperature and the full pairwise collision table from
    /// the current positions and velocities.
    ///
    /// The engine maintains the table incrementally; call this only after
    /// editing positions or velocities from the outside.
    pub fn rebuild_schedule(&mut self) {
        let n = self.disks.len();
        let v2_sum: f64 = self.disks.iter().map(|p| dot(&p.v, &p.v)).sum();
        self.temperature = v2_sum / (2.0 * n as f64);
        self.schedule.clear();
        for i in 0..n {
            for j in (i + 1)..n {
                self.predict_pair(i, j);
            }
        }
    }

    // ============ Internal helpers ============

    /// Resolve one scheduled contact: flight, reflection, local reschedule.
    fn collide(&mut self, collider: usize, dt: f64) -> Result<()> {
        let partner = self.schedule.partner(collider).ok_or(Error::NoCollision)?;
        self.advance_free_flight(dt);
        self.resolve_contact(collider, partner)?;
        self.refresh_predictions(collider, partner);
        self.collisions += 1;
        Ok(())
    }

    /// Move every disk ballistically for `dt`, wrap into the box, bring all
    /// scheduled contacts `dt` closer, and advance the clock.
    fn advance_free_flight(&mut self, dt: f64) {
        for p in &mut self.disks {
            for (r_k, (&v_k, &l)) in p.r.iter_mut().zip(p.v.iter().zip(&self.box_size)) {
                *r_k = wrap_position(*r_k + v_k * dt, l);
            }
        }
        self.schedule.elapse(dt);
        self.time_now += dt;
    }

    /// Elastic contact between equal-mass disks `i` and `j`: reflect the
    /// component of the relative velocity along the line of centers and
    /// add the impulse-separation product to the virial sum.
    fn resolve_contact(&mut self, i: usize, j: usize) -> Result<()> {
        let (ri, rj) = (self.disks[i].r, self.disks[j].r);
        let mut d = [0.0_f64; DIM];
        for (d_k, ((&rj_k, &ri_k), &l)) in d
            .iter_mut()
            .zip(rj.iter().zip(ri.iter()).zip(&self.box_size))
        {
            *d_k = minimum_image(rj_k - ri_k, l);
        }
        let r2 = dot(&d, &d);
        if r2 <= EPS_TIME {
            return Err(Error::MathError(
                "degenerate contact normal between disks".into(),
            ));
        }

        let mut dv = [0.0_f64; DIM];
        for (dv_k, (&vj_k, &vi_k)) in dv
            .iter_mut()
            .zip(self.disks[j].v.iter().zip(self.disks[i].v.iter()))
        {
            *dv_k = vj_k - vi_k;
        }

        // At contact |d| is one diameter; dividing by r2 projects exactly
        // even when flight accumulated a little rounding.
        let factor = dot(&d, &dv) / r2;
        let mut impulse = [0.0_f64; DIM];
        for (imp_k, &d_k) in impulse.iter_mut().zip(&d) {
            *imp_k = -factor * d_k;
        }
        for (k, &imp_k) in impulse.iter().enumerate() {
            self.disks[i].v[k] -= imp_k;
            self.disks[j].v[k] += imp_k;
        }
        self.virial += dot(&impulse, &d);
        Ok(())
    }

    /// Drop the predictions a contact between `i` and `j` made stale, then
    /// re-check every disk against the pair.
    ///
    /// Entries that survive are still the earliest approach known for their
    /// disk, so only the O(N) pairs involving `i` or `j` need another look;
    /// the full table is never rebuilt mid-run.
    fn refresh_predictions(&mut self, i: usize, j: usize) {
        let n = self.disks.len();
        for k in 0..n {
            if k == i
                || k == j
                || self.schedule.partner(k) == Some(i)
                || self.schedule.partner(k) == Some(j)
            {
                self.schedule.invalidate(k);
            }
        }
        for k in 0..n {
            if k != i {
                self.predict_pair(k, i);
            }
            if k != i && k != j {
                self.predict_pair(k, j);
            }
        }
    }

    /// Check disks `i` and `j` for a future contact, trying `j`'s nine
    /// periodic images, and offer the earliest approach to the schedule.
    ///
    /// For relative position `d` and relative velocity `dv`, a contact
    /// needs `b = d . dv < 0` (approaching) and a positive discriminant
    /// `b^2 - |dv|^2 (|d|^2 - 1)`; the earlier quadratic root is the time
    /// the surfaces first touch.
    fn predict_pair(&mut self, i: usize, j: usize) {
        let [lx, ly] = self.box_size;
        let (pi, pj) = (&self.disks[i], &self.disks[j]);
        let dv = [pj.v[0] - pi.v[0], pj.v[1] - pi.v[1]];
        let v2 = dot(&dv, &dv);
        if v2 <= 0.0 {
            return; // no relative motion, no contact ever
        }
        let base = [pj.r[0] - pi.r[0], pj.r[1] - pi.r[1]];
        for ix in -1_i32..=1 {
            for iy in -1_i32..=1 {
                let d = [base[0] + f64::from(ix) * lx, base[1] + f64::from(iy) * ly];
                let b = dot(&d, &dv);
                if b >= 0.0 {
                    continue; // this image is receding or neutral
                }
                let r2 = dot(&d, &d);
                let disc = b * b - v2 * (r2 - DIAMETER * DIAMETER);
                if disc <= 0.0 {
                    continue; // this image misses
                }
                let dt = (-b - disc.sqrt()) / v2;
                // Guard against zero-time events for pairs sitting exactly
                // at contact distance.
                if dt <= EPS_TIME {
                    continue;
                }
                self.schedule.offer(i, j, dt);
            }
        }
    }
}

// ============ Placement ============

/// Triangular lattice fill: ceil(sqrt(n)) columns per row, alternate rows
/// shifted by half a cell. Fails if the resulting spacing puts any two
/// disks closer than one diameter.
fn regular_positions(n: usize, box_size: [f64; DIM]) -> Result<Vec<[f64; DIM]>> {
    let cells = (n as f64).sqrt().ceil() as usize;
    let ax = box_size[0] / cells as f64;
    let ay = box_size[1] / cells as f64;

    let mut out = Vec::with_capacity(n);
    let mut row = 0usize;
    while out.len() < n {
        let offset = if row % 2 == 0 { 0.25 } else { 0.75 };
        for col in 0..cells {
            if out.len() == n {
                break;
            }
            out.push([
                ax * (col as f64 + offset),
                ay * (row as f64 + 0.5),
            ]);
        }
        row += 1;
    }

    for i in 0..n {
        for j in (i + 1)..n {
            if image_distance_sq(&out[i], &out[j], box_size) < DIAMETER * DIAMETER {
                return Err(Error::Configuration(format!(
                    "box {:?} is too small for a regular layout of {n} disks",
                    box_size
                )));
            }
        }
    }
    Ok(out)
}

/// Rejection-sample non-overlapping positions, bounded per disk by
/// `MAX_PLACEMENT_ATTEMPTS`.
fn random_positions(
    n: usize,
    box_size: [f64; DIM],
    rng: &mut StdRng,
) -> Result<Vec<[f64; DIM]>> {
    let mut out: Vec<[f64; DIM]> = Vec::with_capacity(n);
    for i in 0..n {
        let mut attempts = 0usize;
        loop {
            if attempts >= MAX_PLACEMENT_ATTEMPTS {
                return Err(Error::Configuration(format!(
                    "failed to place disk {i} without overlap after {MAX_PLACEMENT_ATTEMPTS} \
                     attempts; lower the density or use the regular layout"
                )));
            }
            attempts += 1;
            let cand = [
                rng.random_range(0.0..box_size[0]),
                rng.random_range(0.0..box_size[1]),
            ];
            let overlaps = out
                .iter()
                .any(|p| image_distance_sq(p, &cand, box_size) < DIAMETER * DIAMETER);
            if !overlaps {
                out.push(cand);
                break;
            }
        }
    }
    Ok(out)
}

// ============ Utility helpers ============

#[inline]
fn dot(a: &[f64; DIM], b: &[f64; DIM]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Fold a displacement component onto the nearest periodic image.
#[inline]
fn minimum_image(dx: f64, l: f64) -> f64 {
    if dx > 0.5 * l {
        dx - l
    } else if dx < -0.5 * l {
        dx + l
    } else {
        dx
    }
}

/// Wrap a coordinate into [0, L).
#[inline]
fn wrap_position(x: f64, l: f64) -> f64 {
    let w = x.rem_euclid(l);
    if w == l {
        0.0
    } else {
        w
    }
}

/// Squared center distance under the minimum-image convention.
#[inline]
fn image_distance_sq(a: &[f64; DIM], b: &[f64; DIM], box_size: [f64; DIM]) -> f64 {
    let mut d = [0.0_f64; DIM];
    for (d_k, ((&a_k, &b_k), &l)) in d
        .iter_mut()
        .zip(a.iter().zip(b.iter()).zip(&box_size))
    {
        *d_k = minimum_image(a_k - b_k, l);
    }
    dot(&d, &d)
}
