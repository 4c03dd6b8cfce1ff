use grid::ModelParams;

/// `a-double-dot` from the Friedmann constraint, in program units (`spec.md` §4.5).
///
/// The `r`-weighted `(adot/a)^2` term mirrors the same combination that appears in the
/// Klein-Gordon acceleration (`spec.md` §4.6): the rescaling exponents `r`, `s` are
/// chosen precisely so that this term cancels the first-derivative friction of the
/// unrescaled equation, leaving the energy-sourced term as the only genuine driver.
/// Resolution of `spec.md` §9 Open Question (a) is recorded in DESIGN.md.
#[cfg(feature = "two-field")]
pub fn adoubledot(a: f64, adot: f64, grad_phi2: f64, grad_chi2: f64, v: f64, params: &ModelParams) -> f64 {
    friction_term(a, adot, params) - source_term(a, grad_phi2 + grad_chi2, v, params)
}

#[cfg(not(feature = "two-field"))]
pub fn adoubledot(a: f64, adot: f64, grad_phi2: f64, v: f64, params: &ModelParams) -> f64 {
    friction_term(a, adot, params) - source_term(a, grad_phi2, v, params)
}

/// Staggered-velocity variant used mid-step (`spec.md` §4.6): uses the half-step
/// `adot_staggered` but the *current* `a`, not a staggered one -- this asymmetry is
/// deliberate (`spec.md` §9 Open Question (a)).
#[cfg(feature = "two-field")]
pub fn adoubledot_staggered(
    a: f64,
    adot_staggered: f64,
    grad_phi2: f64,
    grad_chi2: f64,
    v: f64,
    params: &ModelParams,
) -> f64 {
    adoubledot(a, adot_staggered, grad_phi2, grad_chi2, v, params)
}

#[cfg(not(feature = "two-field"))]
pub fn adoubledot_staggered(a: f64, adot_staggered: f64, grad_phi2: f64, v: f64, params: &ModelParams) -> f64 {
    adoubledot(a, adot_staggered, grad_phi2, v, params)
}

fn friction_term(a: f64, adot: f64, params: &ModelParams) -> f64 {
    params.rescale_r * (adot * adot) / a
}

fn source_term(a: f64, grad_total: f64, v: f64, params: &ModelParams) -> f64 {
    let prefactor = a.powf(1.0 - 2.0 * params.rescale_r) / (6.0 * params.rescale_b * params.rescale_b);
    prefactor * (grad_total + 2.0 * v)
}

/// `d(physical_time)/dt = -s/B * a^{-s-1} * adot` (`spec.md` §4.5), mapping program
/// time onto physical time.
pub fn dptdt(a: f64, adot: f64, params: &ModelParams) -> f64 {
    -(params.rescale_s / params.rescale_b) * a.powf(-params.rescale_s - 1.0) * adot
}

/// Second derivative of the program-to-physical time map, by the chain and product
/// rules applied to [`dptdt`] (`spec.md` §4.5).
pub fn ddptdt(a: f64, adot: f64, addot: f64, params: &ModelParams) -> f64 {
    let s = params.rescale_s;
    let prefactor = -(s / params.rescale_b);
    prefactor * ((-s - 1.0) * a.powf(-s - 2.0) * adot * adot + a.powf(-s - 1.0) * addot)
}
