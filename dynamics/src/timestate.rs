use crate::{DynamicsError, Result};

/// Mutable run clock shared by every component (`spec.md` §3, component 8).
///
/// Only the Verlet integrator and the scale-factor dynamics functions mutate this;
/// everything else borrows it read-only between steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeState {
    /// Dimensionless integrator time.
    pub t: f64,
    /// Scale factor. Must stay `> 0`.
    pub a: f64,
    /// First time derivative of the scale factor.
    pub adot: f64,
    /// Second time derivative of the scale factor.
    pub addot: f64,
    /// Fixed integration timestep. Must stay `> 0`.
    pub dt: f64,
    /// Physical (as opposed to program-unit) elapsed time.
    pub physical_time: f64,
}

impl TimeState {
    /// Builds the initial clock for a run. `a0` must be `> 0` and `dt` must be `> 0`;
    /// these are precondition violations, not recoverable numerical blow-ups.
    pub fn new(t0: f64, a0: f64, adot0: f64, dt: f64) -> Result<Self> {
        if a0 <= 0.0 {
            return Err(DynamicsError::Precondition("initial scale factor a0 must be > 0"));
        }
        if dt <= 0.0 {
            return Err(DynamicsError::Precondition("timestep dt must be > 0"));
        }
        Ok(Self {
            t: t0,
            a: a0,
            adot: adot0,
            addot: 0.0,
            dt,
            physical_time: 0.0,
        })
    }

    /// A step boundary sanity check: `spec.md` §7 treats a non-positive or non-finite
    /// scale factor as a numerical blow-up, reported with the offending step index.
    pub fn check_finite(&self, step: u64) -> Result<()> {
        if !self.a.is_finite() || self.a <= 0.0 {
            return Err(DynamicsError::NumericalBlowup {
                step,
                message: format!("scale factor a={} is non-positive or non-finite", self.a),
            });
        }
        if !self.adot.is_finite() || !self.addot.is_finite() {
            return Err(DynamicsError::NumericalBlowup {
                step,
                message: "scale factor derivative is non-finite".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_initial_scale_factor() {
        assert!(TimeState::new(0.0, 0.0, 0.0, 0.01).is_err());
    }

    #[test]
    fn rejects_non_positive_dt() {
        assert!(TimeState::new(0.0, 1.0, 0.0, 0.0).is_err());
    }

    #[test]
    fn detects_blow_up() {
        let mut ts = TimeState::new(0.0, 1.0, 0.0, 0.01).unwrap();
        ts.a = f64::NAN;
        assert!(ts.check_finite(7).is_err());
    }
}
