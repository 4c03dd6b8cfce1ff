use ndarray::Array3;

use crate::fft::{Complex64, FftPlan};
use crate::{FieldError, Result};

/// Which of the two co-owned buffers currently holds the field's live data.
///
/// `spec.md` §3/§4.1 describe a single backing buffer with two views; this
/// implementation keeps two separately-owned buffers instead (the stale one's contents
/// are simply not touched between transforms) since Rust's ownership model makes a
/// literal reinterpreted-union view either `unsafe` or a second allocation in practice.
/// Either way the contract is the same: at most one representation is live, and
/// accessing the other is always caught, in every build, not only debug ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    Position,
    Momentum,
}

/// A single scalar field living on the lattice, in exactly one of the two
/// representations described in `spec.md` §3.
pub struct Field {
    position: Array3<f64>,
    momentum: Array3<Complex64>,
    state: Representation,
}

impl Field {
    /// Allocates a field of side `n`, zero-filled, starting in position representation.
    pub fn zeros(n: usize) -> Self {
        Self {
            position: Array3::zeros((n, n, n)),
            momentum: Array3::zeros((n, n, n / 2 + 1)),
            state: Representation::Position,
        }
    }

    pub fn state(&self) -> Representation {
        self.state
    }

    pub fn position(&self) -> Result<&Array3<f64>> {
        self.assert_state(Representation::Position)?;
        Ok(&self.position)
    }

    pub fn position_mut(&mut self) -> Result<&mut Array3<f64>> {
        self.assert_state(Representation::Position)?;
        Ok(&mut self.position)
    }

    pub fn momentum(&self) -> Result<&Array3<Complex64>> {
        self.assert_state(Representation::Momentum)?;
        Ok(&self.momentum)
    }

    pub fn momentum_mut(&mut self) -> Result<&mut Array3<Complex64>> {
        self.assert_state(Representation::Momentum)?;
        Ok(&mut self.momentum)
    }

    /// Forces the position buffer to the given contents and marks the field as being
    /// in position representation. Used only by initializers and tests that seed data
    /// directly; ordinary stepping code never needs it.
    pub fn set_position(&mut self, data: Array3<f64>) {
        self.position = data;
        self.state = Representation::Position;
    }

    /// As [`Field::set_position`], for the momentum representation.
    pub fn set_momentum(&mut self, data: Array3<Complex64>) {
        self.momentum = data;
        self.state = Representation::Momentum;
    }

    fn assert_state(&self, expected: Representation) -> Result<()> {
        if self.state != expected {
            return Err(FieldError::WrongState {
                expected,
                actual: self.state,
            });
        }
        Ok(())
    }

    /// Moves the live representation to `target`. A no-op if already there
    /// (`spec.md` §4.1, §8 property 6: idempotent state switch).
    pub fn switch_state(&mut self, target: Representation, plan: &mut FftPlan) -> Result<()> {
        if self.state == target {
            return Ok(());
        }
        match target {
            Representation::Momentum => plan.forward(&self.position, &mut self.momentum)?,
            Representation::Position => plan.inverse(&self.momentum, &mut self.position)?,
        }
        self.state = target;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fft::FftPlan;

    #[test]
    fn round_trip_fft_recovers_input() {
        let n = 8;
        let mut plan = FftPlan::new(n);
        let mut field = Field::zeros(n);

        {
            let pos = field.position_mut().unwrap();
            for x in 0..n {
                for y in 0..n {
                    for z in 0..n {
                        let phase = (x as f64 * 0.7 + y as f64 * 1.3 - z as f64 * 0.4).sin();
                        pos[[x, y, z]] = phase;
                    }
                }
            }
        }
        let original = field.position().unwrap().clone();

        field.switch_state(Representation::Momentum, &mut plan).unwrap();
        assert_eq!(field.state(), Representation::Momentum);
        field.switch_state(Representation::Position, &mut plan).unwrap();

        let recovered = field.position().unwrap();
        for ((x, y, z), &orig) in original.indexed_iter() {
            let got = recovered[[x, y, z]];
            assert!(
                (got - orig).abs() < 1e-10 * orig.abs().max(1.0),
                "mismatch at ({x},{y},{z}): {got} vs {orig}"
            );
        }
    }

    #[test]
    fn idempotent_switch_leaves_data_untouched() {
        let n = 8;
        let mut plan = FftPlan::new(n);
        let mut field = Field::zeros(n);
        field.position_mut().unwrap()[[1, 2, 3]] = 42.0;
        let before = field.position().unwrap().clone();
        field.switch_state(Representation::Position, &mut plan).unwrap();
        assert_eq!(&before, field.position().unwrap());
    }

    #[test]
    fn wrong_state_access_is_an_error() {
        let field = Field::zeros(4);
        assert!(field.momentum().is_err());
    }
}
