//! Scale-factor dynamics and the staggered velocity-Verlet integrator built on them
//! (`spec.md` §4.5–§4.6, §9 "Relationships").

mod error;
mod scalefactor;
mod timestate;
mod verlet;

pub use error::DynamicsError;
pub use scalefactor::{adoubledot, adoubledot_staggered, ddptdt, dptdt};
pub use timestate::TimeState;
pub use verlet::Integrator;

pub type Result<T> = std::result::Result<T, DynamicsError>;
