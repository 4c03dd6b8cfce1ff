#[derive(thiserror::Error, Debug)]
pub enum FieldError {
    /// Element access or an operation was attempted while the field was in the wrong
    /// representation (`spec.md` §4.1: "reading in the wrong state is undefined and
    /// must be detectable in debug builds").
    #[error("field is in {actual:?} state, expected {expected:?}")]
    WrongState {
        expected: crate::Representation,
        actual: crate::Representation,
    },

    /// The FFT backend failed to produce a transform. Fatal: `spec.md` §7 — "the run
    /// cannot continue if FFT capacity is lost."
    #[error("FFT transform failed: {0}")]
    TransformFailure(String),
}
