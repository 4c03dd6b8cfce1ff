//! Grid and model parameters: the immutable description of a SpectRE run (`spec.md` §3).

mod error;
mod params;

pub use error::GridError;
pub use params::{ModelParams, ModelParamsBuilder};

pub type Result<T> = std::result::Result<T, GridError>;

/// Centred index along one axis: `x` for `x <= N/2`, else `x - N`.
///
/// Shared by the gradient accumulator and the nonlinear builder's momentum-space
/// bookkeeping (`spec.md` §6, "Centred indices").
pub fn centred_index(x: usize, n: usize) -> i64 {
    let x = x as i64;
    let n = n as i64;
    if x <= n / 2 { x } else { x - n }
}

/// Parity weight of a Hermitian-packed z-mode: 1 at the two real faces, 2 otherwise
/// (`spec.md` §4.4 / §6).
pub fn z_parity(z: usize, n: usize) -> f64 {
    if z == 0 || z == n / 2 { 1.0 } else { 2.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centred_index_wraps_upper_half() {
        assert_eq!(centred_index(0, 16), 0);
        assert_eq!(centred_index(8, 16), 8);
        assert_eq!(centred_index(9, 16), -7);
        assert_eq!(centred_index(15, 16), -1);
    }

    #[test]
    fn z_parity_edges_are_unweighted() {
        assert_eq!(z_parity(0, 16), 1.0);
        assert_eq!(z_parity(8, 16), 1.0);
        assert_eq!(z_parity(1, 16), 2.0);
        assert_eq!(z_parity(7, 16), 2.0);
    }
}
