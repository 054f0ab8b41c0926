use disksim::core::{Layout, Simulation};
use disksim::error::{Error, Result};

/// The virial estimator divides by elapsed time; calling it on a fresh
/// simulation must be rejected, not returned as NaN.
#[test]
fn pressure_rejected_before_time_elapses() -> Result<()> {
    let sim = Simulation::new(4, [10.0, 10.0], Layout::Regular, Some(11))?;
    let err = sim.pressure().unwrap_err();
    assert!(
        matches!(err, Error::Precondition(_)),
        "pressure at t=0 should be a precondition violation, got {err:?}"
    );
    Ok(())
}

/// A deterministic two-disk bouncer: the estimator must stay finite above
/// the ideal-gas value and settle as collisions accumulate.
#[test]
fn head_on_estimator_settles() -> Result<()> {
    let mut sim = Simulation::new(2, [10.0, 10.0], Layout::Regular, Some(1))?;
    sim.disks[0].r = [4.0, 5.0];
    sim.disks[1].r = [6.0, 5.0];
    sim.disks[0].v = [1.0, 0.0];
    sim.disks[1].v = [-1.0, 0.0];
    sim.rebuild_schedule();

    let mut estimates = Vec::new();
    for _ in 0..6 {
        sim.step()?;
        let p = sim.pressure()?;
        assert!(
            p.is_finite() && p > 1.0,
            "hard-disk virial pressure must be finite and above ideal: {p}"
        );
        estimates.push(p);
    }

    // Each bounce adds the same impulse at regular intervals, so successive
    // estimates move by less and less.
    for w in estimates.windows(3) {
        let step_a = (w[1] - w[0]).abs();
        let step_b = (w[2] - w[1]).abs();
        assert!(
            step_b < step_a,
            "estimator not settling: moves {step_a} then {step_b} ({estimates:?})"
        );
    }
    let last = estimates[estimates.len() - 1];
    assert!(
        (1.25..1.35).contains(&last),
        "estimator after six bounces out of range: {last} ({estimates:?})"
    );
    Ok(())
}

/// A 16-disk lattice gas at moderate density: after many collisions the
/// estimator is finite and above the ideal-gas value (hard cores only push).
#[test]
fn lattice_gas_pressure_exceeds_ideal() -> Result<()> {
    let mut sim = Simulation::new(16, [8.0, 8.0], Layout::Regular, Some(321))?;
    sim.advance_to(50.0)?;
    assert!(sim.collision_count() > 0, "expected collisions by t=50");
    let p = sim.pressure()?;
    assert!(
        p.is_finite() && p > 1.0,
        "lattice gas pressure should exceed the ideal value: {p}"
    );
    Ok(())
}

/// `reset_statistics` restarts the averaging window: the estimator is
/// unavailable again until new simulation time accumulates.
#[test]
fn pressure_window_restarts_on_reset() -> Result<()> {
    let mut sim = Simulation::new(8, [10.0, 10.0], Layout::Random, Some(77))?;
    for _ in 0..10 {
        sim.step()?;
    }
    assert!(sim.pressure()?.is_finite());

    sim.reset_statistics();
    let err = sim.pressure().unwrap_err();
    assert!(
        matches!(err, Error::Precondition(_)),
        "pressure right after reset should be rejected, got {err:?}"
    );

    for _ in 0..10 {
        sim.step()?;
    }
    let p = sim.pressure()?;
    assert!(
        p.is_finite() && p > 1.0,
        "estimator over the fresh window should be finite: {p}"
    );
    Ok(())
}
