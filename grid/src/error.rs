#[derive(thiserror::Error, Debug)]
pub enum GridError {
    /// `N` must be even and at least 4.
    #[error("lattice size N={0} must be even and >= 4")]
    InvalidLatticeSize(usize),

    /// A rescaling or spacing constant that must be strictly positive was not.
    #[error("{name} must be > 0, got {value}")]
    NonPositiveConstant { name: &'static str, value: f64 },

    /// A parameter value is NaN or infinite.
    #[error("{name} is not finite: {value}")]
    NotFinite { name: &'static str, value: f64 },
}
