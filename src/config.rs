//! Driver-only run configuration (`SPEC_FULL.md` §7.2). `spec.md` §6 is explicit that
//! the core never parses configuration; it only ever sees a validated
//! [`grid::ModelParams`]. Everything in this module lives in the binary's world.

use serde::Deserialize;

use grid::ModelParams;

use crate::{Result, SpectreError};

/// TOML-deserializable run description. Field names mirror [`grid::ModelParamsBuilder`]
/// so the conversion below is a straight field-by-field copy.
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    pub n: usize,
    pub l: f64,
    pub rescale_a: f64,
    pub rescale_b: f64,
    #[serde(default)]
    pub rescale_r: f64,
    #[serde(default)]
    pub rescale_s: f64,

    pub m_phi: f64,
    #[serde(default)]
    pub lambda_phi: f64,
    #[serde(default)]
    pub gamma_phi: f64,
    #[serde(default)]
    pub md_e_phi: f64,

    #[serde(default)]
    pub m_chi: f64,
    #[serde(default)]
    pub lambda_chi: f64,
    #[serde(default)]
    pub gamma_chi: f64,
    #[serde(default)]
    pub md_e_chi: f64,
    #[serde(default)]
    pub g: f64,

    /// Initial scale factor and its time derivative.
    #[serde(default = "one")]
    pub a0: f64,
    #[serde(default)]
    pub adot0: f64,
    /// Fixed integration timestep.
    pub dt: f64,
    /// Number of steps to run.
    pub steps: u64,
    /// How many steps between snapshot writes; `0` disables snapshots.
    #[serde(default)]
    pub snapshot_every: u64,
    /// Directory snapshots are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// Reference box size the initial spectrum was computed at, in program-length
    /// units; `None` (absent from the file) means "same as `l`" (`spec.md` §9 Open
    /// Question (c)).
    pub len0: Option<f64>,
    /// Thermal-spectrum seed temperature; absent means a vacuum start.
    pub temperature: Option<f64>,
    /// RNG seed for the initial spectrum draw.
    #[serde(default)]
    pub seed: u64,
}

fn one() -> f64 {
    1.0
}

fn default_output_dir() -> String {
    "snapshots".to_string()
}

impl RunConfig {
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|e| SpectreError::Config(e.to_string()))
    }

    pub fn to_model_params(&self) -> Result<ModelParams> {
        let builder = grid::ModelParamsBuilder {
            n: self.n,
            l: self.l,
            rescale_a: self.rescale_a,
            rescale_b: self.rescale_b,
            rescale_r: self.rescale_r,
            rescale_s: self.rescale_s,
            m_phi: self.m_phi,
            lambda_phi: self.lambda_phi,
            gamma_phi: self.gamma_phi,
            md_e_phi: self.md_e_phi,
            m_chi: self.m_chi,
            lambda_chi: self.lambda_chi,
            gamma_chi: self.gamma_chi,
            md_e_chi: self.md_e_chi,
            g: self.g,
        };
        Ok(ModelParams::new(builder)?)
    }
}
