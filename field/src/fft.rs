use std::panic::{self, AssertUnwindSafe};

use ndarray::Array3;
use ndrustfft::{ndfft, ndfft_r2c, ndifft, ndifft_r2c, Complex, FftHandler, R2cFftHandler};

use crate::{FieldError, Result};

pub type Complex64 = Complex<f64>;

/// Owns the per-axis FFT handlers and scratch buffers needed to transform a lattice of
/// side `N` between position and momentum representation.
///
/// A single plan is shared by every [`crate::Field`] in a run (φ, χ, and every
/// nonlinear-term product field): handler construction does real work (FFT twiddle
/// factor precomputation), so it is amortized across every field that shares the same
/// `N`, the same way the teacher's [`Accelerator`]-bearing state is built once and
/// reused across repeated evaluations.
pub struct FftPlan {
    n: usize,
    z: R2cFftHandler<f64>,
    y: FftHandler<f64>,
    x: FftHandler<f64>,
    scratch_a: Array3<Complex64>,
    scratch_b: Array3<Complex64>,
}

impl FftPlan {
    pub fn new(n: usize) -> Self {
        let nz = n / 2 + 1;
        Self {
            n,
            z: R2cFftHandler::new(n),
            y: FftHandler::new(n),
            x: FftHandler::new(n),
            scratch_a: Array3::zeros((n, n, nz)),
            scratch_b: Array3::zeros((n, n, nz)),
        }
    }

    pub fn n(&self) -> usize {
        self.n
    }

    /// Position -> momentum. Unnormalized, per `spec.md` §4.1's convention: the forward
    /// transform stores unnormalized coefficients.
    ///
    /// `ndrustfft` panics rather than returning a `Result` on a malformed transform
    /// (e.g. mismatched axis lengths between the scratch buffers and the handlers); that
    /// panic is caught and turned into the fatal [`FieldError::TransformFailure`]
    /// `spec.md` §7 requires ("the run cannot continue if FFT capacity is lost"),
    /// keeping the one place that can go wrong behind this crate's own error type
    /// instead of unwinding through it.
    pub fn forward(&mut self, position: &Array3<f64>, momentum: &mut Array3<Complex64>) -> Result<()> {
        let z = &mut self.z;
        let y = &mut self.y;
        let x = &mut self.x;
        let scratch_a = &mut self.scratch_a;
        let scratch_b = &mut self.scratch_b;
        panic::catch_unwind(AssertUnwindSafe(|| {
            ndfft_r2c(position, scratch_a, z, 2);
            ndfft(scratch_a, scratch_b, y, 1);
            ndfft(scratch_b, momentum, x, 0);
        }))
        .map_err(|_| transform_failure("forward R2C transform panicked"))
    }

    /// Momentum -> position. Each 1D inverse divides by that axis's length, so the
    /// round trip divides by `N^3` overall, matching `spec.md` §4.1. See [`forward`]
    /// for why this returns a `Result` at all.
    pub fn inverse(&mut self, momentum: &Array3<Complex64>, position: &mut Array3<f64>) -> Result<()> {
        let z = &mut self.z;
        let y = &mut self.y;
        let x = &mut self.x;
        let scratch_a = &mut self.scratch_a;
        let scratch_b = &mut self.scratch_b;
        panic::catch_unwind(AssertUnwindSafe(|| {
            ndifft(momentum, scratch_a, x, 0);
            ndifft(scratch_a, scratch_b, y, 1);
            ndifft_r2c(scratch_b, position, z, 2);
        }))
        .map_err(|_| transform_failure("inverse C2R transform panicked"))
    }
}

/// Wraps a transform-backend panic/error into the fatal [`FieldError::TransformFailure`]
/// variant (`spec.md` §7: transform backend failure is propagated as fatal).
fn transform_failure(msg: impl Into<String>) -> FieldError {
    FieldError::TransformFailure(msg.into())
}
