use num_dual::Dual64;
use petroflash_core::cubic::{
    acentric_factor_from_kappa, kappa, PengRobinson, PengRobinsonParameters, PengRobinsonRecord,
};
use petroflash_core::parameter::{Identifier, Parameter, PureRecord};
use petroflash_core::si::{MolarWeight, JOULE, KELVIN, KILOGRAM, MOL, RGAS};
use petroflash_core::{EosError, EosResult, EquationOfState, Root};
use ndarray::arr1;
use std::sync::Arc;

const ATM: f64 = 101325.0;
const MAX_ITER_OMEGA: usize = 20;
/// Standard conditions of the relative density.
const T_STANDARD: f64 = 288.15;
/// Density of water at standard conditions in kg/m³.
const WATER_DENSITY: f64 = 999.1;
/// Molar mass in g/mol at which the slope correlation has its maximum.
const SLOPE_PEAK_MOLAR_WEIGHT: f64 = 0.00549269 / (2.0 * 4.93049e-6);

/// Characterization input of a TBP fraction.
#[derive(Debug, Clone, PartialEq)]
pub struct TbpFraction {
    pub name: String,
    pub molar_weight: MolarWeight,
    /// Specific gravity at 60 °F relative to water.
    pub relative_density: f64,
}

impl TbpFraction {
    pub fn new(name: &str, molar_weight: MolarWeight, relative_density: f64) -> Self {
        Self {
            name: name.to_string(),
            molar_weight,
            relative_density,
        }
    }
}

/// Estimation of critical properties of pseudo-components.
pub trait TbpCorrelation: Send + Sync {
    fn name(&self) -> &str;

    /// Peng-Robinson parameters of the fraction.
    fn characterize(&self, fraction: &TbpFraction) -> EosResult<PengRobinsonRecord>;
}

/// Correlation of Pedersen et al. for the Peng-Robinson equation of state.
///
/// Critical temperature, critical pressure and the slope of the alpha
/// function are linear combinations of the molar mass and the relative
/// density. The slope is kept on the record and the acentric factor is
/// recovered from it. Beyond its maximum near 557 g/mol the slope is held
/// constant. The volume translation reproduces the relative density of
/// the fraction at 15 °C and 1 atm.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pedersen;

impl Pedersen {
    /// Valid range of the molar mass in kg/mol.
    pub const MOLAR_WEIGHT_RANGE: (f64, f64) = (0.06, 1.5);
    /// Valid range of the relative density.
    pub const RELATIVE_DENSITY_RANGE: (f64, f64) = (0.55, 1.2);

    fn check(name: &str, property: &str, value: f64, (min, max): (f64, f64)) -> EosResult<()> {
        if value.is_finite() && (min..=max).contains(&value) {
            Ok(())
        } else {
            Err(EosError::InvalidCorrelationInput {
                name: name.to_string(),
                property: property.to_string(),
                value,
                min,
                max,
            })
        }
    }
}

impl TbpCorrelation for Pedersen {
    fn name(&self) -> &str {
        "Pedersen (Peng-Robinson)"
    }

    fn characterize(&self, fraction: &TbpFraction) -> EosResult<PengRobinsonRecord> {
        let mw = fraction.molar_weight.convert_into(KILOGRAM / MOL);
        let rho = fraction.relative_density;
        Self::check(&fraction.name, "molar mass [kg/mol]", mw, Self::MOLAR_WEIGHT_RANGE)?;
        Self::check(&fraction.name, "relative density", rho, Self::RELATIVE_DENSITY_RANGE)?;

        let m = mw * 1e3;
        let tc = 73.4043 * rho + 97.3562 * m.ln() + 0.618744 * m - 2059.32 / m;
        let pc = (0.0728462 + 2.18811 * rho.powf(0.25) + 163.91 / m - 4043.23 / (m * m)).exp() * ATM;
        let ms = m.min(SLOPE_PEAK_MOLAR_WEIGHT);
        let slope = 0.373765 + 0.00549269 * ms + 0.0117934 * rho - 4.93049e-6 * ms * ms;
        // slopes between the two branches of kappa use the quadratic branch
        let acentric_factor = acentric_factor_from_slope(slope)
            .or_else(|| acentric_factor_from_kappa(slope))
            .ok_or_else(|| EosError::InvalidCorrelationInput {
                name: fraction.name.clone(),
                property: "alpha slope".to_string(),
                value: slope,
                min: kappa(0.0),
                max: f64::INFINITY,
            })?;
        let record = PengRobinsonRecord::new(tc, pc, acentric_factor).alpha_slope(slope);
        let shift = density_matching_shift(&record, m, rho)?;
        Ok(record.volume_shift(shift))
    }
}

/// Volume translation in m³/mol for which the liquid at standard
/// conditions has the density `relative_density` times that of water.
fn density_matching_shift(
    record: &PengRobinsonRecord,
    molar_weight: f64,
    relative_density: f64,
) -> EosResult<f64> {
    let pure = PureRecord::new(Identifier::default(), molar_weight, record.clone());
    let eos = PengRobinson::new(Arc::new(PengRobinsonParameters::from_records(vec![pure], None)?));
    let z = eos.compressibility_factor(T_STANDARD, ATM, &arr1(&[1.0]), Root::Liquid)?;
    let v = z * RGAS.convert_into(JOULE / (MOL * KELVIN)) * T_STANDARD / ATM;
    Ok(v - molar_weight * 1e-3 / (relative_density * WATER_DENSITY))
}

/// Solve $\kappa(\omega)=m$ for the acentric factor.
fn acentric_factor_from_slope(slope: f64) -> Option<f64> {
    let mut w = acentric_factor_from_kappa(slope)?;
    // the high acentric factor branch is not quadratic
    for _ in 0..MAX_ITER_OMEGA {
        let k = kappa(Dual64::from_re(w).derivative());
        let dw = (k.re - slope) / k.eps;
        w -= dw;
        if dw.abs() < 1e-14 {
            break;
        }
    }
    (w.is_finite() && (kappa(w) - slope).abs() < 1e-10).then_some(w)
}
