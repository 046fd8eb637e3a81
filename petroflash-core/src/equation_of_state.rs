use crate::errors::{EosError, EosResult};
use crate::si::{JOULE, KELVIN, MOL, RGAS};
use crate::state::Root;
use ndarray::Array1;
use num_dual::{DualNum, HyperDual64};
use std::fmt;

/// Number of components and the construction of subsystems.
pub trait Components {
    /// Return the number of components of the model.
    fn components(&self) -> usize;

    /// Return a model including only the components specified in `component_list`.
    fn subset(&self, component_list: &[usize]) -> EosResult<Self>
    where
        Self: Sized;
}

/// A pressure explicit equation of state with a cubic volume dependence.
///
/// Temperatures are passed in Kelvin, pressures in Pascal and molar
/// volumes in m³/mol. The trait is the seam for alternative cubic models.
pub trait EquationOfState: Components + Send + Sync + fmt::Display {
    /// Molar weights of all components in g/mol.
    fn molar_weight(&self) -> Array1<f64>;

    /// All roots of the cubic in the compressibility factor that lie
    /// above the reduced covolume, in ascending order.
    fn compressibility_roots(&self, temperature: f64, pressure: f64, molefracs: &Array1<f64>)
        -> Vec<f64>;

    /// Logarithms of the fugacity coefficients evaluated at the compressibility factor `z`.
    fn ln_phi(
        &self,
        temperature: f64,
        pressure: f64,
        molefracs: &Array1<f64>,
        z: f64,
    ) -> Array1<f64>;

    /// Residual molar Gibbs energy divided by RT at the compressibility factor `z`.
    fn residual_gibbs_energy(
        &self,
        temperature: f64,
        pressure: f64,
        molefracs: &Array1<f64>,
        z: f64,
    ) -> f64;

    /// Pressure as a function of temperature and molar volume.
    fn pressure<D: DualNum<f64> + Copy>(&self, temperature: D, molar_volume: D, molefracs: &Array1<f64>)
        -> D;

    /// Volume translation of the mixture in m³/mol. Zero if the model
    /// does not apply a volume correction.
    fn volume_shift(&self, molefracs: &Array1<f64>) -> f64;

    /// Mole fraction of components that constitute an aqueous phase.
    fn aqueous_fraction(&self, molefracs: &Array1<f64>) -> f64;

    /// Wilson estimate of the equilibrium ratios.
    fn wilson_k(&self, temperature: f64, pressure: f64) -> Array1<f64>;

    /// Select the compressibility factor according to `root`.
    ///
    /// If the cubic has a single root, [Root::Liquid] and [Root::Vapor]
    /// only accept it when its phase identification parameter matches,
    /// otherwise the result is [EosError::NoPhysicalRoot].
    fn compressibility_factor(
        &self,
        temperature: f64,
        pressure: f64,
        molefracs: &Array1<f64>,
        root: Root,
    ) -> EosResult<f64> {
        let roots = self.compressibility_roots(temperature, pressure, molefracs);
        // a single root has to be of the requested kind
        let r = RGAS.convert_into(JOULE / (MOL * KELVIN));
        let pip = |z: f64| {
            self.phase_identification_parameter(temperature, z * r * temperature / pressure, molefracs)
        };
        let z = match root {
            Root::Liquid => roots
                .first()
                .copied()
                .filter(|&z| roots.len() > 1 || pip(z) >= 1.0),
            Root::Vapor => roots
                .last()
                .copied()
                .filter(|&z| roots.len() > 1 || pip(z) < 1.0),
            Root::MinimumGibbs => roots
                .iter()
                .map(|&z| {
                    let g = self.residual_gibbs_energy(temperature, pressure, molefracs, z);
                    (z, g)
                })
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(z, _)| z),
        };
        z.ok_or(EosError::NoPhysicalRoot {
            temperature,
            pressure,
        })
    }

    /// Phase identification parameter of Venkatarathnam and Oellrich.
    ///
    /// Values above one indicate a liquid-like phase, values below one
    /// a vapor-like phase.
    fn phase_identification_parameter(
        &self,
        temperature: f64,
        molar_volume: f64,
        molefracs: &Array1<f64>,
    ) -> f64 {
        let mut t = HyperDual64::from_re(temperature);
        t.eps1 = 1.0;
        let mut v = HyperDual64::from_re(molar_volume);
        v.eps2 = 1.0;
        let p = self.pressure(t, v, molefracs);
        let (dp_dt, dp_dv, d2p_dtdv) = (p.eps1, p.eps2, p.eps1eps2);

        let t = HyperDual64::from_re(temperature);
        let mut v = HyperDual64::from_re(molar_volume);
        v.eps1 = 1.0;
        v.eps2 = 1.0;
        let d2p_dv2 = self.pressure(t, v, molefracs).eps1eps2;

        molar_volume * (d2p_dtdv / dp_dt - d2p_dv2 / dp_dv)
    }
}
