use crate::{GridError, Result};

/// Immutable description of the lattice and the model being integrated on it.
///
/// Constructed once per run via [`ModelParams::new`], which enforces every invariant
/// `spec.md` §3 requires; nothing downstream re-validates these values.
#[derive(Debug, Clone, Copy, PartialEq)]
#[non_exhaustive]
pub struct ModelParams {
    /// Lattice points per side. Even, `>= 4`.
    pub n: usize,
    /// Physical side length of the box, in program units.
    pub l: f64,
    /// Momentum-grid spacing `dp = 2*pi / L`.
    pub dp: f64,

    /// Program-units rescaling constant `A` (field amplitude rescaling).
    pub rescale_a: f64,
    /// Program-units rescaling constant `B` (time rescaling).
    pub rescale_b: f64,
    /// Program-units rescaling exponent `r`.
    pub rescale_r: f64,
    /// Program-units rescaling exponent `s`.
    pub rescale_s: f64,

    /// φ mass.
    pub m_phi: f64,
    /// φ quartic self-coupling.
    pub lambda_phi: f64,
    /// φ sextic self-coupling.
    pub gamma_phi: f64,
    /// φ mass-damping exponent; zero disables the mass-damping term.
    pub md_e_phi: f64,

    /// χ mass. Only meaningful when the `two-field` feature is enabled.
    #[cfg(feature = "two-field")]
    pub m_chi: f64,
    /// χ quartic self-coupling.
    #[cfg(feature = "two-field")]
    pub lambda_chi: f64,
    /// χ sextic self-coupling.
    #[cfg(feature = "two-field")]
    pub gamma_chi: f64,
    /// χ mass-damping exponent; zero disables the mass-damping term.
    #[cfg(feature = "two-field")]
    pub md_e_chi: f64,

    /// φ-χ cross-coupling `g`.
    #[cfg(feature = "two-field")]
    pub g: f64,
}

/// Parameters needed to build a [`ModelParams`], grouped the way a config file would.
///
/// `chi` fields are only read when the `two-field` feature is enabled; they are still
/// accepted here so a single `RunConfig` shape works for both build artifacts.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelParamsBuilder {
    pub n: usize,
    pub l: f64,
    pub rescale_a: f64,
    pub rescale_b: f64,
    pub rescale_r: f64,
    pub rescale_s: f64,
    pub m_phi: f64,
    pub lambda_phi: f64,
    pub gamma_phi: f64,
    pub md_e_phi: f64,
    pub m_chi: f64,
    pub lambda_chi: f64,
    pub gamma_chi: f64,
    pub md_e_chi: f64,
    pub g: f64,
}

impl ModelParams {
    /// Validates and builds a [`ModelParams`] from a [`ModelParamsBuilder`].
    ///
    /// `dp` is derived as `2*pi / L`; callers never set it directly, matching
    /// `spec.md` §3's definition of `dp` as a function of the box size.
    pub fn new(b: ModelParamsBuilder) -> Result<Self> {
        if b.n < 4 || b.n % 2 != 0 {
            return Err(GridError::InvalidLatticeSize(b.n));
        }
        check_positive("L", b.l)?;
        check_positive("rescale_A", b.rescale_a)?;
        check_positive("rescale_B", b.rescale_b)?;
        check_finite("rescale_r", b.rescale_r)?;
        check_finite("rescale_s", b.rescale_s)?;
        check_finite("m_phi", b.m_phi)?;
        check_finite("lambda_phi", b.lambda_phi)?;
        check_finite("gamma_phi", b.gamma_phi)?;
        check_finite("md_e_phi", b.md_e_phi)?;
        #[cfg(feature = "two-field")]
        {
            check_finite("m_chi", b.m_chi)?;
            check_finite("lambda_chi", b.lambda_chi)?;
            check_finite("gamma_chi", b.gamma_chi)?;
            check_finite("md_e_chi", b.md_e_chi)?;
            check_finite("g", b.g)?;
        }

        let dp = std::f64::consts::TAU / b.l;
        check_positive("dp", dp)?;

        Ok(Self {
            n: b.n,
            l: b.l,
            dp,
            rescale_a: b.rescale_a,
            rescale_b: b.rescale_b,
            rescale_r: b.rescale_r,
            rescale_s: b.rescale_s,
            m_phi: b.m_phi,
            lambda_phi: b.lambda_phi,
            gamma_phi: b.gamma_phi,
            md_e_phi: b.md_e_phi,
            #[cfg(feature = "two-field")]
            m_chi: b.m_chi,
            #[cfg(feature = "two-field")]
            lambda_chi: b.lambda_chi,
            #[cfg(feature = "two-field")]
            gamma_chi: b.gamma_chi,
            #[cfg(feature = "two-field")]
            md_e_chi: b.md_e_chi,
            #[cfg(feature = "two-field")]
            g: b.g,
        })
    }

    /// Number of complex modes stored along the z (Hermitian) axis: `N/2 + 1`.
    pub fn nz_modes(&self) -> usize {
        self.n / 2 + 1
    }

    /// Total real-space grid points, `N^3`.
    pub fn total_gridpoints(&self) -> usize {
        self.n * self.n * self.n
    }

    /// Volume of the box in program units, `L^3`.
    pub fn volume(&self) -> f64 {
        self.l * self.l * self.l
    }
}

fn check_positive(name: &'static str, value: f64) -> Result<()> {
    check_finite(name, value)?;
    if value <= 0.0 {
        return Err(GridError::NonPositiveConstant { name, value });
    }
    Ok(())
}

fn check_finite(name: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(GridError::NotFinite { name, value });
    }
    Ok(())
}
