use ndarray::Zip;

use crate::Field;
use grid::ModelParams;

use crate::Result;

/// Volume-averaged potential energy density `<V(phi, chi, a)>` (`spec.md` §4.3).
///
/// Neither field is mutated; both must already be in position representation.
#[cfg(feature = "two-field")]
pub fn integrate(phi: &Field, chi: &Field, a: f64, params: &ModelParams) -> Result<f64> {
    let phi_pos = phi.position()?;
    let chi_pos = chi.position()?;

    let mut sum = 0.0;
    Zip::from(phi_pos).and(chi_pos).for_each(|&p, &c| {
        sum += phi_density(p, a, params) + chi_density(c, a, params) + cross_density(p, c, params);
    });

    Ok(sum / params.total_gridpoints() as f64)
}

#[cfg(not(feature = "two-field"))]
pub fn integrate(phi: &Field, a: f64, params: &ModelParams) -> Result<f64> {
    let phi_pos = phi.position()?;
    let sum: f64 = phi_pos.iter().map(|&p| phi_density(p, a, params)).sum();
    Ok(sum / params.total_gridpoints() as f64)
}

/// Potential energy density at a single lattice point, the per-point term [`integrate`]
/// averages over the lattice. Exposed for consumers (e.g. the snapshot sink's energy
/// density) that need the un-averaged pointwise value.
#[cfg(feature = "two-field")]
pub fn density_at_point(p: f64, c: f64, a: f64, params: &ModelParams) -> f64 {
    phi_density(p, a, params) + chi_density(c, a, params) + cross_density(p, c, params)
}

#[cfg(not(feature = "two-field"))]
pub fn density_at_point(p: f64, a: f64, params: &ModelParams) -> f64 {
    phi_density(p, a, params)
}

fn phi_density(p: f64, a: f64, params: &ModelParams) -> f64 {
    let mass_term = if params.md_e_phi != 0.0 {
        let e = params.md_e_phi;
        p.abs().powf(e + 2.0) / (e + 2.0)
    } else {
        0.5 * params.m_phi * params.m_phi * p * p
    };
    let quartic = if params.lambda_phi != 0.0 {
        params.lambda_phi / (4.0 * params.rescale_a.powi(2)) * p.powi(4)
    } else {
        0.0
    };
    let sextic = if params.gamma_phi != 0.0 {
        let a_pow = a.powf(-2.0 * params.rescale_r);
        params.gamma_phi / (6.0 * params.rescale_a.powi(4)) * a_pow * p.powi(6)
    } else {
        0.0
    };
    mass_term + quartic + sextic
}

#[cfg(feature = "two-field")]
fn chi_density(c: f64, a: f64, params: &ModelParams) -> f64 {
    let mass_term = if params.md_e_chi != 0.0 {
        let e = params.md_e_chi;
        c.abs().powf(e + 2.0) / (e + 2.0)
    } else {
        0.5 * params.m_chi * params.m_chi * c * c
    };
    let quartic = if params.lambda_chi != 0.0 {
        params.lambda_chi / (4.0 * params.rescale_a.powi(2)) * c.powi(4)
    } else {
        0.0
    };
    let sextic = if params.gamma_chi != 0.0 {
        let a_pow = a.powf(-2.0 * params.rescale_r);
        params.gamma_chi / (6.0 * params.rescale_a.powi(4)) * a_pow * c.powi(6)
    } else {
        0.0
    };
    mass_term + quartic + sextic
}

#[cfg(feature = "two-field")]
fn cross_density(p: f64, c: f64, params: &ModelParams) -> f64 {
    if params.g == 0.0 {
        return 0.0;
    }
    0.5 * (params.g / params.rescale_a).powi(2) * p * p * c * c
}
