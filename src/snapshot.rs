//! Snapshot sink: writes position-space field slices to the on-disk format
//! `spec.md` §4.7/§6 fixes exactly (no header, raw little-endian doubles).

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use field::Field;
use grid::ModelParams;

use crate::Result;

/// Receives a field in position representation and an energy density array and
/// commits them to stable storage. `spec.md` §4.7 deliberately leaves the format
/// undictated by the core; this trait is the seam the driver binds to
/// [`FileSnapshotSink`].
pub trait SnapshotSink {
    fn write_field(&mut self, name: &str, index: u32, data: &ndarray::Array3<f64>) -> Result<()>;
}

/// Writes one `<field>_<5-digit index>.bin` file per call, each holding `N^3`
/// raw little-endian `f64`s in the position array's row-major order
/// (`spec.md` §6: "Position array ... linear index z + N*(y + N*x)").
pub struct FileSnapshotSink {
    directory: PathBuf,
}

impl FileSnapshotSink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self { directory: directory.into() }
    }

    fn path_for(&self, name: &str, index: u32) -> PathBuf {
        self.directory.join(format!("{name}_{index:05}.bin"))
    }
}

impl SnapshotSink for FileSnapshotSink {
    fn write_field(&mut self, name: &str, index: u32, data: &ndarray::Array3<f64>) -> Result<()> {
        let path = self.path_for(name, index);
        let file = File::create(&path)?;
        let mut writer = BufWriter::new(file);
        for &value in data.iter() {
            writer.write_all(&value.to_le_bytes())?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Volume energy density `rho(x) = 0.5*phidot^2 + 0.5*|grad(phi)|^2 + V(phi, chi, a) + ...`
/// at every lattice point, in position space (`spec.md` §4.7).
///
/// `phidot`/`chidot` and the field gradients must already be available in position
/// space; this function does not switch representations itself, since the caller
/// (the driver, between steps) owns that choice.
#[cfg(feature = "two-field")]
pub fn energy_density(
    phi_pos: &ndarray::Array3<f64>,
    chi_pos: &ndarray::Array3<f64>,
    phidot_pos: &ndarray::Array3<f64>,
    chidot_pos: &ndarray::Array3<f64>,
    grad_phi2_pos: &ndarray::Array3<f64>,
    grad_chi2_pos: &ndarray::Array3<f64>,
    a: f64,
    params: &ModelParams,
) -> ndarray::Array3<f64> {
    use ndarray::Zip;

    let mut rho = ndarray::Array3::zeros(phi_pos.raw_dim());
    Zip::from(&mut rho)
        .and(phidot_pos)
        .and(chidot_pos)
        .and(grad_phi2_pos)
        .and(grad_chi2_pos)
        .and(phi_pos)
        .and(chi_pos)
        .for_each(|rho, &pd, &cd, &gp, &gc, &p, &c| {
            let kinetic = 0.5 * (pd * pd + cd * cd);
            let gradient = 0.5 * (gp + gc);
            let potential = field::potential::density_at_point(p, c, a, params);
            *rho = kinetic + gradient + potential;
        });
    rho
}

#[cfg(not(feature = "two-field"))]
pub fn energy_density(
    phi_pos: &ndarray::Array3<f64>,
    phidot_pos: &ndarray::Array3<f64>,
    grad_phi2_pos: &ndarray::Array3<f64>,
    a: f64,
    params: &ModelParams,
) -> ndarray::Array3<f64> {
    use ndarray::Zip;

    let mut rho = ndarray::Array3::zeros(phi_pos.raw_dim());
    Zip::from(&mut rho)
        .and(phidot_pos)
        .and(grad_phi2_pos)
        .and(phi_pos)
        .for_each(|rho, &pd, &gp, &p| {
            let kinetic = 0.5 * pd * pd;
            let gradient = 0.5 * gp;
            let potential = field::potential::density_at_point(p, a, params);
            *rho = kinetic + gradient + potential;
        });
    rho
}

/// Hands a field in position representation to a [`SnapshotSink`], by name, after
/// converting from program units back to physical units (`phi_physical = phi / A`,
/// `spec.md` §8 scenario S3: a uniform `phi = 2.0` writes as `2/A` everywhere).
pub fn dump_field(sink: &mut dyn SnapshotSink, name: &str, index: u32, phi: &Field, params: &ModelParams) -> Result<()> {
    let physical = phi.position()?.mapv(|v| v / params.rescale_a);
    sink.write_field(name, index, &physical)
}

/// Scans `directory` for the next unused snapshot index for `name` (used by the driver
/// to resume appending snapshots to an existing output directory).
pub fn next_index(directory: &Path, name: &str) -> u32 {
    let mut index = 0;
    while directory.join(format!("{name}_{index:05}.bin")).exists() {
        index += 1;
    }
    index
}
