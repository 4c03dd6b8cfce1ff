use grid::{centred_index, z_parity, ModelParams};
use rayon::prelude::*;

use crate::Field;
use crate::Result;

/// Raw parity-weighted mode sum `Sum_k parity(k) * |k|^2 * |f_hat(k)|^2`
/// (`spec.md` §4.4, §6).
///
/// This is *not* yet volume-normalized: callers accumulate it alongside the kinetic
/// terms during a step and normalize the running total by `total_gridpoints()^2` once,
/// per `spec.md` §4.6 ("Normalize the two accumulated gradient sums by
/// total_gridpoints^2"), rather than re-normalizing every individual contribution.
///
/// The reduction is a fixed-schedule tree sum over rows (one work item per `x` plane),
/// giving bit-reproducible results for a fixed thread count (`spec.md` §5).
pub fn mode_sum(field: &Field, params: &ModelParams) -> Result<f64> {
    let momentum = field.momentum()?;
    let n = params.n;
    let dp2 = params.dp * params.dp;

    let sum = (0..n)
        .into_par_iter()
        .map(|x| {
            let px = centred_index(x, n) as f64;
            let mut plane_sum = 0.0;
            for y in 0..n {
                let py = centred_index(y, n) as f64;
                for z in 0..=n / 2 {
                    let pz = z as f64;
                    let k2 = dp2 * (px * px + py * py + pz * pz);
                    let amp = momentum[[x, y, z]];
                    let weight = z_parity(z, n);
                    plane_sum += weight * k2 * (amp.re * amp.re + amp.im * amp.im);
                }
            }
            plane_sum
        })
        .sum();
    Ok(sum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fft::Complex64;
    use grid::ModelParamsBuilder;

    fn params(n: usize) -> ModelParams {
        ModelParams::new(ModelParamsBuilder {
            n,
            l: std::f64::consts::TAU,
            rescale_a: 1.0,
            rescale_b: 1.0,
            m_phi: 1.0,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn zero_mode_only_gives_zero_gradient() {
        let params = params(8);
        let mut field = Field::zeros(params.n);
        field
            .switch_state(crate::Representation::Momentum, &mut crate::fft::FftPlan::new(params.n))
            .unwrap();
        let m = field.momentum_mut().unwrap();
        m[[0, 0, 0]] = Complex64::new(3.0, 0.0);
        assert_eq!(mode_sum(&field, &params).unwrap(), 0.0);
    }

    #[test]
    fn single_real_face_mode_matches_k_squared_amplitude_squared() {
        let params = params(8);
        let mut field = Field::zeros(params.n);
        field
            .switch_state(crate::Representation::Momentum, &mut crate::fft::FftPlan::new(params.n))
            .unwrap();
        let m = field.momentum_mut().unwrap();
        // z=0 is a real face (parity weight 1), so no ambiguity from doubling.
        let amplitude = Complex64::new(1.5, -0.5);
        m[[2, 0, 0]] = amplitude;
        let k2 = params.dp * params.dp * 4.0;
        let expected = k2 * (amplitude.re * amplitude.re + amplitude.im * amplitude.im);
        let got = mode_sum(&field, &params).unwrap();
        assert!((got - expected).abs() < 1e-12);
    }
}
