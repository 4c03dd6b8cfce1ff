use ndarray::parallel::prelude::*;
use ndarray::Zip;

use crate::field::Representation;
use crate::fft::FftPlan;
use crate::{Field, Result};
use grid::ModelParams;

/// Produces, for a snapshot of the fields in position space, every monomial product
/// `spec.md` §4.2 lists, delivered back in momentum space. Products gated off by a
/// zero coupling are left `None`; the consumer falls back to the plain mass term.
#[non_exhaustive]
pub struct NonlinearTerms {
    /// `chi^2 * phi`, always computed in a two-field build.
    #[cfg(feature = "two-field")]
    pub chi2phi: Field,
    /// `phi^2 * chi`, always computed in a two-field build.
    #[cfg(feature = "two-field")]
    pub phi2chi: Field,
    /// `phi^3`, present only when `lambda_phi != 0`.
    pub phi3: Option<Field>,
    /// `chi^3`, present only when `lambda_chi != 0`.
    #[cfg(feature = "two-field")]
    pub chi3: Option<Field>,
    /// `phi^5`, present only when `gamma_phi != 0`.
    pub phi5: Option<Field>,
    /// `chi^5`, present only when `gamma_chi != 0`.
    #[cfg(feature = "two-field")]
    pub chi5: Option<Field>,
    /// `sign(phi) * |phi|^(md_e_phi+1)`, present only when `md_e_phi != 0`.
    pub phi_md: Option<Field>,
    /// `sign(chi) * |chi|^(md_e_chi+1)`, present only when `md_e_chi != 0`.
    #[cfg(feature = "two-field")]
    pub chi_md: Option<Field>,
}

impl NonlinearTerms {
    pub fn zeros(params: &ModelParams) -> Self {
        let n = params.n;
        Self {
            #[cfg(feature = "two-field")]
            chi2phi: Field::zeros(n),
            #[cfg(feature = "two-field")]
            phi2chi: Field::zeros(n),
            phi3: (params.lambda_phi != 0.0).then(|| Field::zeros(n)),
            #[cfg(feature = "two-field")]
            chi3: (params.lambda_chi != 0.0).then(|| Field::zeros(n)),
            phi5: (params.gamma_phi != 0.0).then(|| Field::zeros(n)),
            #[cfg(feature = "two-field")]
            chi5: (params.gamma_chi != 0.0).then(|| Field::zeros(n)),
            phi_md: (params.md_e_phi != 0.0).then(|| Field::zeros(n)),
            #[cfg(feature = "two-field")]
            chi_md: (params.md_e_chi != 0.0).then(|| Field::zeros(n)),
        }
    }
}

fn monomial_to_momentum(
    out: &mut Field,
    plan: &mut FftPlan,
    fill: impl FnOnce(&mut ndarray::Array3<f64>),
) -> Result<()> {
    fill(out.position_mut()?);
    out.switch_state(Representation::Momentum, plan)
}

#[cfg(feature = "two-field")]
impl NonlinearTerms {
    /// Builds every product field from `phi` and `chi`, both of which must already be
    /// in position representation (`spec.md` §4.2's stated precondition).
    pub fn build(
        &mut self,
        phi: &mut Field,
        chi: &mut Field,
        params: &ModelParams,
        plan: &mut FftPlan,
    ) -> Result<()> {
        let phi_pos = phi.position()?.clone();
        let chi_pos = chi.position()?.clone();

        monomial_to_momentum(&mut self.chi2phi, plan, |buf| {
            Zip::from(buf).and(&phi_pos).and(&chi_pos).par_for_each(|b, &p, &c| *b = c * c * p);
        })?;
        monomial_to_momentum(&mut self.phi2chi, plan, |buf| {
            Zip::from(buf).and(&phi_pos).and(&chi_pos).par_for_each(|b, &p, &c| *b = p * p * c);
        })?;
        if let Some(phi3) = &mut self.phi3 {
            monomial_to_momentum(phi3, plan, |buf| {
                Zip::from(buf).and(&phi_pos).par_for_each(|b, &p| *b = p * p * p);
            })?;
        }
        if let Some(chi3) = &mut self.chi3 {
            monomial_to_momentum(chi3, plan, |buf| {
                Zip::from(buf).and(&chi_pos).par_for_each(|b, &c| *b = c * c * c);
            })?;
        }
        if let Some(phi5) = &mut self.phi5 {
            monomial_to_momentum(phi5, plan, |buf| {
                Zip::from(buf).and(&phi_pos).par_for_each(|b, &p| *b = p.powi(5));
            })?;
        }
        if let Some(chi5) = &mut self.chi5 {
            monomial_to_momentum(chi5, plan, |buf| {
                Zip::from(buf).and(&chi_pos).par_for_each(|b, &c| *b = c.powi(5));
            })?;
        }
        if let Some(phi_md) = &mut self.phi_md {
            let e = params.md_e_phi;
            monomial_to_momentum(phi_md, plan, |buf| {
                Zip::from(buf).and(&phi_pos).par_for_each(|b, &p| *b = p.signum() * p.abs().powf(e + 1.0));
            })?;
        }
        if let Some(chi_md) = &mut self.chi_md {
            let e = params.md_e_chi;
            monomial_to_momentum(chi_md, plan, |buf| {
                Zip::from(buf).and(&chi_pos).par_for_each(|b, &c| *b = c.signum() * c.abs().powf(e + 1.0));
            })?;
        }
        Ok(())
    }
}

#[cfg(not(feature = "two-field"))]
impl NonlinearTerms {
    /// Builds every product field from `phi`, which must already be in position
    /// representation (`spec.md` §4.2's stated precondition).
    pub fn build(&mut self, phi: &mut Field, params: &ModelParams, plan: &mut FftPlan) -> Result<()> {
        let phi_pos = phi.position()?.clone();

        if let Some(phi3) = &mut self.phi3 {
            monomial_to_momentum(phi3, plan, |buf| {
                Zip::from(buf).and(&phi_pos).par_for_each(|b, &p| *b = p * p * p);
            })?;
        }
        if let Some(phi5) = &mut self.phi5 {
            monomial_to_momentum(phi5, plan, |buf| {
                Zip::from(buf).and(&phi_pos).par_for_each(|b, &p| *b = p.powi(5));
            })?;
        }
        if let Some(phi_md) = &mut self.phi_md {
            let e = params.md_e_phi;
            monomial_to_momentum(phi_md, plan, |buf| {
                Zip::from(buf).and(&phi_pos).par_for_each(|b, &p| *b = p.signum() * p.abs().powf(e + 1.0));
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid::ModelParamsBuilder;

    fn params(overrides: impl FnOnce(&mut ModelParamsBuilder)) -> ModelParams {
        let mut b = ModelParamsBuilder {
            n: 8,
            l: std::f64::consts::TAU,
            rescale_a: 1.0,
            rescale_b: 1.0,
            m_phi: 1.0,
            ..Default::default()
        };
        overrides(&mut b);
        ModelParams::new(b).unwrap()
    }

    #[test]
    #[cfg(feature = "two-field")]
    fn cross_products_on_constant_fields() {
        let params = params(|b| b.g = 1.0);
        let mut plan = FftPlan::new(params.n);
        let mut phi = Field::zeros(params.n);
        let mut chi = Field::zeros(params.n);
        phi.position_mut().unwrap().fill(1.0);
        chi.position_mut().unwrap().fill(0.5);

        let mut terms = NonlinearTerms::zeros(&params);
        terms.build(&mut phi, &mut chi, &params, &mut plan).unwrap();

        terms.chi2phi.switch_state(Representation::Position, &mut plan).unwrap();
        terms.phi2chi.switch_state(Representation::Position, &mut plan).unwrap();

        for &v in terms.chi2phi.position().unwrap().iter() {
            assert!((v - 0.25).abs() < 1e-9);
        }
        for &v in terms.phi2chi.position().unwrap().iter() {
            assert!((v - 0.5).abs() < 1e-9);
        }
    }

    #[test]
    fn gated_off_coupling_leaves_product_unallocated() {
        let params = params(|b| {
            b.lambda_phi = 0.0;
            b.gamma_phi = 0.0;
        });
        let terms = NonlinearTerms::zeros(&params);
        assert!(terms.phi3.is_none());
        assert!(terms.phi5.is_none());
    }
}
