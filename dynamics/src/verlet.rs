use ndarray::parallel::prelude::*;
use ndarray::{Array3, Zip};

use field::{fft::Complex64, Field, FftPlan, NonlinearTerms, Representation};
use grid::{centred_index, ModelParams};

use crate::{scalefactor, DynamicsError, Result, TimeState};

/// Drives φ (and, in a two-field build, χ) forward with the staggered
/// velocity-Verlet scheme (`spec.md` §4.6, component 7).
///
/// φ, χ and their first derivatives are owned by the caller and borrowed in every call;
/// their authoritative state is visible to the driver between steps (`spec.md` §3,
/// "Relationships"). Everything else here -- the half-step velocities, the current
/// accelerations, the shared FFT plan and the nonlinear-term scratch space -- is
/// private integrator scratch, created once and reused every step.
pub struct Integrator {
    time: TimeState,
    params: ModelParams,
    plan: FftPlan,
    nonlinear: NonlinearTerms,

    phiddot: Field,
    #[cfg(feature = "two-field")]
    chiddot: Field,
    phidot_staggered: Field,
    #[cfg(feature = "two-field")]
    chidot_staggered: Field,

    dptdt: f64,
    ddptdt: f64,
    dptdt_staggered: f64,
    step_index: u64,
}

fn zero_momentum_field(n: usize) -> Field {
    let mut f = Field::zeros(n);
    f.set_momentum(Array3::zeros((n, n, n / 2 + 1)));
    f
}

impl Integrator {
    pub fn new(params: ModelParams, time: TimeState) -> Self {
        let n = params.n;
        Self {
            plan: FftPlan::new(n),
            nonlinear: NonlinearTerms::zeros(&params),
            phiddot: zero_momentum_field(n),
            #[cfg(feature = "two-field")]
            chiddot: zero_momentum_field(n),
            phidot_staggered: zero_momentum_field(n),
            #[cfg(feature = "two-field")]
            chidot_staggered: zero_momentum_field(n),
            dptdt: 0.0,
            ddptdt: 0.0,
            dptdt_staggered: 0.0,
            step_index: 0,
            params,
            time,
        }
    }

    pub fn time(&self) -> TimeState {
        self.time
    }

    pub fn step_index(&self) -> u64 {
        self.step_index
    }

    pub fn dptdt(&self) -> f64 {
        self.dptdt
    }

    pub fn ddptdt(&self) -> f64 {
        self.ddptdt
    }
}

#[cfg(feature = "two-field")]
impl Integrator {
    /// Computes the initial accelerations and scale-factor derivatives from the current
    /// field state. `phi`, `chi`, `phidot`, `chidot` must all already be in momentum
    /// representation; `self.time` (`a`, `adot`, `dt`) must already be set by the
    /// driver.
    pub fn initialize(&mut self, phi: &mut Field, chi: &mut Field, phidot: &mut Field, chidot: &mut Field) -> Result<()> {
        require_momentum(phi)?;
        require_momentum(chi)?;
        require_momentum(phidot)?;
        require_momentum(chidot)?;

        let params = self.params;
        let a = self.time.a;
        let adot = self.time.adot;
        let norm = (params.total_gridpoints() as f64).powi(2);

        let grad_phi2 = field::gradient::mode_sum(phi, &params)? / norm;
        let grad_chi2 = field::gradient::mode_sum(chi, &params)? / norm;

        let v = self.potential_and_nonlinear(phi, chi, a)?;

        let addot = scalefactor::adoubledot(a, adot, grad_phi2, grad_chi2, v, &params);
        self.time.addot = addot;
        self.dptdt = scalefactor::dptdt(a, adot, &params);
        self.ddptdt = scalefactor::ddptdt(a, adot, addot, &params);

        self.accelerate_both(phi, chi, a, adot, addot)?;
        self.step_index = 0;
        Ok(())
    }

    /// Advances the whole system (scale factor, both fields, both velocities) by one
    /// timestep, following the stage order `spec.md` §4.6/§5 mandates: scale-factor
    /// drift, momentum-space kick-drift with gradient accumulation, scale-factor
    /// second-derivative update, nonlinear term rebuild, then the closing velocity
    /// kick with the freshly recomputed acceleration.
    pub fn step(&mut self, phi: &mut Field, chi: &mut Field, phidot: &mut Field, chidot: &mut Field) -> Result<()> {
        require_momentum(phi)?;
        require_momentum(chi)?;
        require_momentum(phidot)?;
        require_momentum(chidot)?;

        let params = self.params;
        let dt = self.time.dt;
        let t = self.time.t;
        let a = self.time.a;
        let adot = self.time.adot;
        let addot = self.time.addot;

        let adot_staggered = adot + 0.5 * addot * dt;
        self.dptdt_staggered = self.dptdt + 0.5 * self.ddptdt * dt;

        let a_new = a + adot * dt + 0.5 * addot * dt * dt;
        self.time.physical_time += self.dptdt * dt + 0.5 * self.ddptdt * dt * dt;

        kick_drift(phi, phidot, &self.phiddot, &mut self.phidot_staggered, dt)?;
        kick_drift(chi, chidot, &self.chiddot, &mut self.chidot_staggered, dt)?;

        let norm = (params.total_gridpoints() as f64).powi(2);
        let grad_phi2 = field::gradient::mode_sum(phi, &params)? / norm;
        let grad_chi2 = field::gradient::mode_sum(chi, &params)? / norm;

        let v = self.potential_and_nonlinear(phi, chi, a_new)?;

        let addot_new = scalefactor::adoubledot_staggered(a_new, adot_staggered, grad_phi2, grad_chi2, v, &params);
        let adot_new = adot_staggered + 0.5 * addot_new * dt;
        let ddptdt_new = scalefactor::ddptdt(a_new, adot_new, addot_new, &params);
        let dptdt_new = self.dptdt_staggered + 0.5 * ddptdt_new * dt;

        self.accelerate_both(phi, chi, a_new, adot_new, addot_new)?;

        finish_kick(phidot, &self.phidot_staggered, &self.phiddot, dt)?;
        finish_kick(chidot, &self.chidot_staggered, &self.chiddot, dt)?;

        self.time.t = t + dt;
        self.time.a = a_new;
        self.time.adot = adot_new;
        self.time.addot = addot_new;
        self.dptdt = dptdt_new;
        self.ddptdt = ddptdt_new;

        self.step_index += 1;
        self.time.check_finite(self.step_index)?;
        Ok(())
    }

    /// Switches `phi`/`chi` to position state, computes `<V>` and rebuilds the
    /// nonlinear products, then switches both back to momentum. Used identically by
    /// `initialize` and `step` (`spec.md` §4.6). `a` is the scale factor `<V>` should be
    /// evaluated at -- the caller passes the already-drifted `a_new` from `step()`, not
    /// `self.time.a`, which is only assigned `a_new` once the step finishes.
    fn potential_and_nonlinear(&mut self, phi: &mut Field, chi: &mut Field, a: f64) -> Result<f64> {
        phi.switch_state(Representation::Position, &mut self.plan)?;
        chi.switch_state(Representation::Position, &mut self.plan)?;
        let v = field::potential::integrate(phi, chi, a, &self.params)?;
        self.nonlinear.build(phi, chi, &self.params, &mut self.plan)?;
        phi.switch_state(Representation::Momentum, &mut self.plan)?;
        chi.switch_state(Representation::Momentum, &mut self.plan)?;
        Ok(v)
    }

    fn accelerate_both(&mut self, phi: &Field, chi: &Field, a: f64, adot: f64, addot: f64) -> Result<()> {
        let params = self.params;
        accelerate(
            &mut self.phiddot,
            phi.momentum()?,
            Some(self.nonlinear.chi2phi.momentum()?),
            self.nonlinear.phi3.as_ref().map(Field::momentum).transpose()?,
            self.nonlinear.phi5.as_ref().map(Field::momentum).transpose()?,
            self.nonlinear.phi_md.as_ref().map(Field::momentum).transpose()?,
            Coupling {
                mass: params.m_phi,
                lambda: params.lambda_phi,
                gamma: params.gamma_phi,
                md_e: params.md_e_phi,
                cross_g: params.g,
            },
            a,
            adot,
            addot,
            &params,
        )?;
        accelerate(
            &mut self.chiddot,
            chi.momentum()?,
            Some(self.nonlinear.phi2chi.momentum()?),
            self.nonlinear.chi3.as_ref().map(Field::momentum).transpose()?,
            self.nonlinear.chi5.as_ref().map(Field::momentum).transpose()?,
            self.nonlinear.chi_md.as_ref().map(Field::momentum).transpose()?,
            Coupling {
                mass: params.m_chi,
                lambda: params.lambda_chi,
                gamma: params.gamma_chi,
                md_e: params.md_e_chi,
                cross_g: params.g,
            },
            a,
            adot,
            addot,
            &params,
        )?;
        Ok(())
    }
}

#[cfg(not(feature = "two-field"))]
impl Integrator {
    pub fn initialize(&mut self, phi: &mut Field, phidot: &mut Field) -> Result<()> {
        require_momentum(phi)?;
        require_momentum(phidot)?;

        let params = self.params;
        let a = self.time.a;
        let adot = self.time.adot;
        let norm = (params.total_gridpoints() as f64).powi(2);

        let grad_phi2 = field::gradient::mode_sum(phi, &params)? / norm;
        let v = self.potential_and_nonlinear(phi, a)?;

        let addot = scalefactor::adoubledot(a, adot, grad_phi2, v, &params);
        self.time.addot = addot;
        self.dptdt = scalefactor::dptdt(a, adot, &params);
        self.ddptdt = scalefactor::ddptdt(a, adot, addot, &params);

        self.accelerate_phi(phi, a, adot, addot)?;
        self.step_index = 0;
        Ok(())
    }

    pub fn step(&mut self, phi: &mut Field, phidot: &mut Field) -> Result<()> {
        require_momentum(phi)?;
        require_momentum(phidot)?;

        let params = self.params;
        let dt = self.time.dt;
        let t = self.time.t;
        let a = self.time.a;
        let adot = self.time.adot;
        let addot = self.time.addot;

        let adot_staggered = adot + 0.5 * addot * dt;
        self.dptdt_staggered = self.dptdt + 0.5 * self.ddptdt * dt;

        let a_new = a + adot * dt + 0.5 * addot * dt * dt;
        self.time.physical_time += self.dptdt * dt + 0.5 * self.ddptdt * dt * dt;

        kick_drift(phi, phidot, &self.phiddot, &mut self.phidot_staggered, dt)?;

        let norm = (params.total_gridpoints() as f64).powi(2);
        let grad_phi2 = field::gradient::mode_sum(phi, &params)? / norm;

        let v = self.potential_and_nonlinear(phi, a_new)?;

        let addot_new = scalefactor::adoubledot_staggered(a_new, adot_staggered, grad_phi2, v, &params);
        let adot_new = adot_staggered + 0.5 * addot_new * dt;
        let ddptdt_new = scalefactor::ddptdt(a_new, adot_new, addot_new, &params);
        let dptdt_new = self.dptdt_staggered + 0.5 * ddptdt_new * dt;

        self.accelerate_phi(phi, a_new, adot_new, addot_new)?;

        finish_kick(phidot, &self.phidot_staggered, &self.phiddot, dt)?;

        self.time.t = t + dt;
        self.time.a = a_new;
        self.time.adot = adot_new;
        self.time.addot = addot_new;
        self.dptdt = dptdt_new;
        self.ddptdt = ddptdt_new;

        self.step_index += 1;
        self.time.check_finite(self.step_index)?;
        Ok(())
    }

    fn potential_and_nonlinear(&mut self, phi: &mut Field, a: f64) -> Result<f64> {
        phi.switch_state(Representation::Position, &mut self.plan)?;
        let v = field::potential::integrate(phi, a, &self.params)?;
        self.nonlinear.build(phi, &self.params, &mut self.plan)?;
        phi.switch_state(Representation::Momentum, &mut self.plan)?;
        Ok(v)
    }

    fn accelerate_phi(&mut self, phi: &Field, a: f64, adot: f64, addot: f64) -> Result<()> {
        let params = self.params;
        accelerate(
            &mut self.phiddot,
            phi.momentum()?,
            None,
            self.nonlinear.phi3.as_ref().map(Field::momentum).transpose()?,
            self.nonlinear.phi5.as_ref().map(Field::momentum).transpose()?,
            self.nonlinear.phi_md.as_ref().map(Field::momentum).transpose()?,
            Coupling {
                mass: params.m_phi,
                lambda: params.lambda_phi,
                gamma: params.gamma_phi,
                md_e: params.md_e_phi,
                cross_g: 0.0,
            },
            a,
            adot,
            addot,
            &params,
        )?;
        Ok(())
    }
}

fn require_momentum(field: &Field) -> Result<()> {
    if field.state() != Representation::Momentum {
        return Err(DynamicsError::Precondition(
            "fields and velocities must be in momentum representation at a step boundary",
        ));
    }
    Ok(())
}

/// The per-mode kick-drift half of the staggered scheme (`spec.md` §4.6): first the
/// half-step velocity `staggered_out = vel + 0.5*dt*accel`, then the field drift
/// `field += dt*staggered_out`, both in momentum space.
fn kick_drift(field: &mut Field, vel: &Field, accel: &Field, staggered_out: &mut Field, dt: f64) -> Result<()> {
    {
        let v = vel.momentum()?;
        let a = accel.momentum()?;
        let sv = staggered_out.momentum_mut()?;
        Zip::from(sv).and(v).and(a).for_each(|sv, &v, &a| *sv = v + 0.5 * dt * a);
    }
    let sv = staggered_out.momentum()?;
    let buf = field.momentum_mut()?;
    Zip::from(buf).and(sv).for_each(|f, &sv| *f += sv * dt);
    Ok(())
}

/// The closing velocity kick (`spec.md` §4.6): `vel_out = staggered + 0.5*dt*accel`,
/// using the acceleration recomputed at the new state.
fn finish_kick(vel_out: &mut Field, staggered: &Field, accel: &Field, dt: f64) -> Result<()> {
    let s = staggered.momentum()?;
    let a = accel.momentum()?;
    let buf = vel_out.momentum_mut()?;
    Zip::from(buf).and(s).and(a).for_each(|v, &s, &a| *v = s + 0.5 * dt * a);
    Ok(())
}

/// Per-field self-coupling constants the Klein-Gordon kernel needs (`spec.md` §4.6).
struct Coupling {
    mass: f64,
    lambda: f64,
    gamma: f64,
    md_e: f64,
    cross_g: f64,
}

fn hat_or_zero(term: Option<&Array3<Complex64>>, x: usize, y: usize, z: usize) -> Complex64 {
    term.map(|arr| arr[[x, y, z]]).unwrap_or_else(|| Complex64::new(0.0, 0.0))
}

/// Klein-Gordon acceleration per momentum-space mode (`spec.md` §4.6), writing the
/// result into `out`. Linear (Laplacian, friction, mass) terms come directly from
/// `field_momentum`; the nonlinear bracket terms come from the momentum-space monomial
/// products the nonlinear-term builder produced this step, each gated by its coupling.
#[allow(clippy::too_many_arguments)]
fn accelerate(
    out: &mut Field,
    field_momentum: &Array3<Complex64>,
    cross_hat: Option<&Array3<Complex64>>,
    cubic_hat: Option<&Array3<Complex64>>,
    quintic_hat: Option<&Array3<Complex64>>,
    md_hat: Option<&Array3<Complex64>>,
    coupling: Coupling,
    a: f64,
    adot: f64,
    addot: f64,
    params: &ModelParams,
) -> Result<()> {
    let n = params.n;
    let dp2 = params.dp * params.dp;
    let r = params.rescale_r;
    let s = params.rescale_s;
    let b2 = params.rescale_b * params.rescale_b;
    let a_amp2 = params.rescale_a * params.rescale_a;
    let a_amp4 = a_amp2 * a_amp2;

    let buf = out.momentum_mut()?;
    Zip::indexed(buf).and(field_momentum).par_for_each(|(x, y, z), o, &f| {
        let px = centred_index(x, n) as f64;
        let py = centred_index(y, n) as f64;
        let pz = z as f64;
        let k2 = dp2 * (px * px + py * py + pz * pz);

        let laplacian = -a.powf(-2.0 * s - 2.0) * k2 * f;
        let friction = r * ((s - r + 2.0) * (adot / a).powi(2) + addot / a) * f;

        let mass_term = if coupling.md_e != 0.0 {
            a.powf(2.0 * r) * hat_or_zero(md_hat, x, y, z)
        } else {
            coupling.mass * coupling.mass * a.powf(2.0 * r) * f
        };

        let mut bracket = mass_term;
        if coupling.lambda != 0.0 {
            bracket += (coupling.lambda / a_amp2) * hat_or_zero(cubic_hat, x, y, z);
        }
        if coupling.cross_g != 0.0 {
            bracket += (coupling.cross_g / params.rescale_a).powi(2) * hat_or_zero(cross_hat, x, y, z);
        }
        if coupling.gamma != 0.0 {
            bracket += (coupling.gamma / a_amp4) * a.powf(-2.0 * r) * hat_or_zero(quintic_hat, x, y, z);
        }

        *o = laplacian + friction - (a.powf(-2.0 * s - 2.0 * r) / b2) * bracket;
    });
    Ok(())
}
