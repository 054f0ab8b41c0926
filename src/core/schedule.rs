/// Sentinel meaning "no collision predicted" for a schedule entry.
pub const BIG_TIME: f64 = 1e10;

/// Per-disk table of the single nearest predicted collision.
///
/// Each disk stores only the earliest contact predicted for it so far: the
/// time until that contact (relative to the present) and the partner it was
/// predicted against. A candidate replaces an entry only if it is earlier,
/// which is what makes a linear scan of the table sufficient to find the
/// next event in the whole system. Ties resolve to the lowest disk index so
/// event order is deterministic.
#[derive(Debug)]
pub struct CollisionSchedule {
    time_to_event: Vec<f64>,
    partner: Vec<Option<usize>>,
}

impl CollisionSchedule {
    /// An empty schedule for `n` disks: every entry at `BIG_TIME`, no partners.
    pub fn new(n: usize) -> Self {
        Self {
            time_to_event: vec![BIG_TIME; n],
            partner: vec![None; n],
        }
    }

    /// Number of entries (one per disk).
    pub fn len(&self) -> usize {
        self.time_to_event.len()
    }

    /// True if the schedule tracks no disks at all.
    pub fn is_empty(&self) -> bool {
        self.time_to_event.is_empty()
    }

    /// Time until disk `i`'s predicted collision (`BIG_TIME` if none).
    #[inline]
    pub fn time(&self, i: usize) -> f64 {
        self.time_to_event[i]
    }

    /// Predicted partner of disk `i`, if any.
    #[inline]
    pub fn partner(&self, i: usize) -> Option<usize> {
        self.partner[i]
    }

    /// Offer a predicted contact between `i` and `j`, `dt` from now.
    /// Each side keeps the candidate only if it beats its current entry.
    pub fn offer(&mut self, i: usize, j: usize, dt: f64) {
        if dt < self.time_to_event[i] {
            self.time_to_event[i] = dt;
            self.partner[i] = Some(j);
        }
        if dt < self.time_to_event[j] {
            self.time_to_event[j] = dt;
            self.partner[j] = Some(i);
        }
    }

    /// Drop disk `i`'s prediction (entry back to the sentinel).
    pub fn invalidate(&mut self, i: usize) {
        self.time_to_event[i] = BIG_TIME;
        self.partner[i] = None;
    }

    /// Drop every prediction.
    pub fn clear(&mut self) {
        self.time_to_event.fill(BIG_TIME);
        self.partner.fill(None);
    }

    /// Earliest scheduled entry as `(disk index, time until contact)`,
    /// or `None` when nothing is predicted anywhere.
    pub fn next_event(&self) -> Option<(usize, f64)> {
        let mut best = BIG_TIME;
        let mut who: Option<usize> = None;
        for (i, (&t, p)) in self.time_to_event.iter().zip(&self.partner).enumerate() {
            if p.is_some() && t < best {
                best = t;
                who = Some(i);
            }
        }
        who.map(|i| (i, best))
    }

    /// Let `dt` of free flight pass: every scheduled contact comes `dt`
    /// closer. Sentinel entries are left at `BIG_TIME`.
    pub fn elapse(&mut self, dt: f64) {
        for (t, p) in self.time_to_event.iter_mut().zip(&self.partner) {
            if p.is_some() {
                *t -= dt;
            }
        }
    }
}
