#[derive(thiserror::Error, Debug)]
pub enum DynamicsError {
    /// Propagated from the field/FFT layer.
    #[error(transparent)]
    Field(#[from] field::FieldError),

    /// Propagated from a malformed [`grid::ModelParams`] (should not normally occur,
    /// since the driver validates before handing parameters to the integrator).
    #[error(transparent)]
    Grid(#[from] grid::GridError),

    /// A field value, energy, or the scale factor itself stopped being finite or `a`
    /// turned non-positive. Detected at a step boundary and reported with the step
    /// index (`spec.md` §7: numerical blow-up).
    #[error("numerical blow-up at step {step}: {message}")]
    NumericalBlowup { step: u64, message: String },

    /// A precondition of `initialize()` or `step()` was violated by the caller.
    #[error("precondition violation: {0}")]
    Precondition(&'static str),
}
