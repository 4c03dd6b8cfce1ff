//! Seeds φ (and, in a two-field build, χ) from a thermal or vacuum mode spectrum.
//!
//! `spec.md` names this only as an external collaborator behind the core's momentum-
//! state precondition for `initialize()`; the algorithm itself is supplemented here
//! (`SPEC_FULL.md` §4.8) from how lattice-reheating codes in this family actually seed
//! a run: draw each mode's amplitude and conjugate momentum as independent Gaussians
//! whose variance is the canonical zero-point spectrum, optionally inflated by a
//! Bose-Einstein occupation number for a thermal start.

use field::{fft::Complex64, Field};
use grid::{centred_index, ModelParams};
use ndarray::Array3;
use rand::Rng;
use rand_distr::StandardNormal;

use crate::{Result, SpectreError};

enum Occupation {
    Vacuum,
    Thermal { temperature: f64 },
}

impl Occupation {
    /// Bose-Einstein occupation number at mode energy `omega_k`; `0` for the vacuum.
    fn number(&self, omega_k: f64) -> f64 {
        match self {
            Occupation::Vacuum => 0.0,
            Occupation::Thermal { temperature } => {
                let x = omega_k / temperature;
                if x <= 0.0 {
                    return f64::INFINITY;
                }
                1.0 / (x.exp() - 1.0)
            }
        }
    }
}

/// Draws φ (and, in a two-field build, χ) from the canonical vacuum (zero-point) mode
/// spectrum.
pub struct VacuumSpectrum;

/// As [`VacuumSpectrum`], with the zero-point variance additionally scaled by the
/// Bose-Einstein occupation number at the given temperature (program units).
pub struct ThermalSpectrum {
    pub temperature: f64,
}

impl VacuumSpectrum {
    pub fn seed_phi(&self, rng: &mut impl Rng, params: &ModelParams, len0: Option<f64>, phi: &mut Field, phidot: &mut Field) -> Result<()> {
        seed(&Occupation::Vacuum, rng, params, params.m_phi, len0, phi, phidot)
    }

    #[cfg(feature = "two-field")]
    pub fn seed_chi(&self, rng: &mut impl Rng, params: &ModelParams, len0: Option<f64>, chi: &mut Field, chidot: &mut Field) -> Result<()> {
        seed(&Occupation::Vacuum, rng, params, params.m_chi, len0, chi, chidot)
    }
}

impl ThermalSpectrum {
    pub fn seed_phi(&self, rng: &mut impl Rng, params: &ModelParams, len0: Option<f64>, phi: &mut Field, phidot: &mut Field) -> Result<()> {
        let occupation = Occupation::Thermal { temperature: self.temperature };
        seed(&occupation, rng, params, params.m_phi, len0, phi, phidot)
    }

    #[cfg(feature = "two-field")]
    pub fn seed_chi(&self, rng: &mut impl Rng, params: &ModelParams, len0: Option<f64>, chi: &mut Field, chidot: &mut Field) -> Result<()> {
        let occupation = Occupation::Thermal { temperature: self.temperature };
        seed(&occupation, rng, params, params.m_chi, len0, chi, chidot)
    }
}

/// Fills `field` (amplitude) and `veldot` (conjugate momentum) in momentum
/// representation, mode by mode. `len0`, when given, is the reference box size the
/// spectrum was originally computed at; it rescales the mode spacing used for `omega_k`
/// without affecting the run's own `dp` (`spec.md` §9 Open Question (c), resolved in
/// DESIGN.md). Absent, it defaults to the run's own box size (no rescaling).
fn seed(
    occupation: &Occupation,
    rng: &mut impl Rng,
    params: &ModelParams,
    mass: f64,
    len0: Option<f64>,
    field: &mut Field,
    veldot: &mut Field,
) -> Result<()> {
    let n = params.n;
    let dp_eff = match len0 {
        Some(l0) if l0 > 0.0 => std::f64::consts::TAU / l0,
        _ => params.dp,
    };
    let volume = params.volume();

    let mut amplitude = Array3::<Complex64>::zeros((n, n, n / 2 + 1));
    let mut momentum = Array3::<Complex64>::zeros((n, n, n / 2 + 1));

    for x in 0..n {
        let px = centred_index(x, n) as f64;
        for y in 0..n {
            let py = centred_index(y, n) as f64;
            for z in 0..=n / 2 {
                let pz = z as f64;
                let k2 = dp_eff * dp_eff * (px * px + py * py + pz * pz);
                let omega_k = (k2 + mass * mass).sqrt().max(1e-12);
                let zero_point_and_thermal = 1.0 + 2.0 * occupation.number(omega_k);

                let amp_sigma = (zero_point_and_thermal / (2.0 * omega_k * volume)).sqrt();
                let mom_sigma = (zero_point_and_thermal * omega_k / (2.0 * volume)).sqrt();

                // Self-conjugate faces of the packed grid (`spec.md` §6): the zero mode
                // and the Nyquist plane must be real to preserve Hermitian symmetry.
                let real_only = z == 0 || z == n / 2;

                let re: f64 = rng.sample(StandardNormal);
                let im: f64 = if real_only { 0.0 } else { rng.sample(StandardNormal) };
                amplitude[[x, y, z]] = Complex64::new(re * amp_sigma, im * amp_sigma);

                let vre: f64 = rng.sample(StandardNormal);
                let vim: f64 = if real_only { 0.0 } else { rng.sample(StandardNormal) };
                momentum[[x, y, z]] = Complex64::new(vre * mom_sigma, vim * mom_sigma);
            }
        }
    }

    field.set_momentum(amplitude);
    veldot.set_momentum(momentum);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use field::Representation;
    use grid::ModelParamsBuilder;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn params() -> ModelParams {
        ModelParams::new(ModelParamsBuilder {
            n: 8,
            l: std::f64::consts::TAU,
            rescale_a: 1.0,
            rescale_b: 1.0,
            m_phi: 1.0,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn vacuum_spectrum_leaves_fields_in_momentum_state() {
        let params = params();
        let mut rng = StdRng::seed_from_u64(7);
        let mut phi = Field::zeros(params.n);
        let mut phidot = Field::zeros(params.n);
        VacuumSpectrum.seed_phi(&mut rng, &params, None, &mut phi, &mut phidot).unwrap();
        assert_eq!(phi.state(), Representation::Momentum);
        assert_eq!(phidot.state(), Representation::Momentum);
    }

    #[test]
    fn zero_mode_and_nyquist_face_are_real() {
        let params = params();
        let mut rng = StdRng::seed_from_u64(3);
        let mut phi = Field::zeros(params.n);
        let mut phidot = Field::zeros(params.n);
        VacuumSpectrum.seed_phi(&mut rng, &params, None, &mut phi, &mut phidot).unwrap();
        let m = phi.momentum().unwrap();
        assert_eq!(m[[0, 0, 0]].im, 0.0);
        assert_eq!(m[[0, 0, params.n / 2]].im, 0.0);
    }
}
