//! Spectral/position hybrid field container and the per-step field math built on it
//! (`spec.md` §4.1–§4.5).

mod error;
pub mod fft;
mod field;
pub mod gradient;
mod nonlinear;
pub mod potential;

pub use error::FieldError;
pub use fft::{Complex64, FftPlan};
pub use field::{Field, Representation};
pub use nonlinear::NonlinearTerms;

pub type Result<T> = std::result::Result<T, FieldError>;
