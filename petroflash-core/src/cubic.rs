//! Implementation of the Peng-Robinson equation of state.
//!
//! The alpha function follows Peng and Robinson (1976) with the extension
//! of Robinson and Peng (1978) for acentric factors above 0.49. Mixture
//! parameters are obtained from the classic quadratic mixing rule with
//! binary interaction parameters `k_ij`. Liquid volumes can optionally be
//! corrected with the volume translation of Péneloux et al.
use crate::equation_of_state::{Components, EquationOfState};
use crate::errors::{EosError, EosResult};
use crate::parameter::{Identifier, Parameter, ParameterError, PureRecord};
use ndarray::{Array1, Array2};
use num_dual::{Dual64, DualNum};
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, SQRT_2};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

const R: f64 = 8.31446261815324;
const OMEGA_A: f64 = 0.45724;
const OMEGA_B: f64 = 0.07780;
const DELTA_1: f64 = 1.0 + SQRT_2;
const DELTA_2: f64 = 1.0 - SQRT_2;
const NEWTON_STEPS: usize = 5;

/// Peng-Robinson parameters for a single substance.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct PengRobinsonRecord {
    /// critical temperature in Kelvin
    tc: f64,
    /// critical pressure in Pascal
    pc: f64,
    /// acentric factor
    acentric_factor: f64,
    /// slope of the alpha function, if not given by the acentric factor
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    alpha_slope: Option<f64>,
    /// volume translation in m³/mol
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    volume_shift: Option<f64>,
    /// the substance forms an aqueous phase
    #[serde(default)]
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    aqueous: bool,
}

impl PengRobinsonRecord {
    /// Create a new pure substance record for the Peng-Robinson equation of state.
    pub fn new(tc: f64, pc: f64, acentric_factor: f64) -> Self {
        Self {
            tc,
            pc,
            acentric_factor,
            alpha_slope: None,
            volume_shift: None,
            aqueous: false,
        }
    }

    /// Use an explicit slope of the alpha function instead of [kappa] of
    /// the acentric factor.
    pub fn alpha_slope(mut self, alpha_slope: f64) -> Self {
        self.alpha_slope = Some(alpha_slope);
        self
    }

    /// Use an explicit volume translation (m³/mol) instead of the correlation.
    pub fn volume_shift(mut self, volume_shift: f64) -> Self {
        self.volume_shift = Some(volume_shift);
        self
    }

    /// Mark the substance as a constituent of aqueous phases.
    pub fn aqueous(mut self, aqueous: bool) -> Self {
        self.aqueous = aqueous;
        self
    }

    pub fn tc(&self) -> f64 {
        self.tc
    }

    pub fn pc(&self) -> f64 {
        self.pc
    }

    pub fn acentric_factor(&self) -> f64 {
        self.acentric_factor
    }

    pub fn is_aqueous(&self) -> bool {
        self.aqueous
    }

    /// Slope $m$ of the alpha function $\alpha=\left(1+m\left(1-\sqrt{T_r}\right)\right)^2$.
    pub fn kappa(&self) -> f64 {
        self.alpha_slope.unwrap_or_else(|| kappa(self.acentric_factor))
    }

    /// Volume translation in m³/mol.
    ///
    /// Péneloux correlation based on the Rackett compressibility factor
    /// estimated from the acentric factor.
    pub fn translation(&self) -> f64 {
        self.volume_shift.unwrap_or_else(|| {
            let z_ra = 0.29056 - 0.08775 * self.acentric_factor;
            0.50033 * (0.25969 - z_ra) * R * self.tc / self.pc
        })
    }
}

impl std::fmt::Display for PengRobinsonRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PengRobinsonRecord(tc={} K", self.tc)?;
        write!(f, ", pc={} Pa", self.pc)?;
        write!(f, ", acentric factor={}", self.acentric_factor)?;
        if let Some(m) = self.alpha_slope {
            write!(f, ", alpha slope={}", m)?;
        }
        if let Some(c) = self.volume_shift {
            write!(f, ", volume shift={} m³/mol", c)?;
        }
        if self.aqueous {
            write!(f, ", aqueous")?;
        }
        write!(f, ")")
    }
}

/// Slope of the alpha function.
pub fn kappa<D: DualNum<f64> + Copy>(acentric_factor: D) -> D {
    let w = acentric_factor;
    if w.re() <= 0.49 {
        (w * -0.26992 + 1.54226) * w + 0.37464
    } else {
        ((w * 0.016666 - 0.164423) * w + 1.48503) * w + 0.379642
    }
}

/// Inverse of [kappa] on the branch used for acentric factors up to 0.49
/// and continued beyond it.
pub fn acentric_factor_from_kappa(kappa: f64) -> Option<f64> {
    let (a, b, c) = (0.26992, -1.54226, kappa - 0.37464);
    let disc = b * b - 4.0 * a * c;
    (disc >= 0.0).then(|| (-b - disc.sqrt()) / (2.0 * a))
}

/// Rule that combines pure component energy parameters.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MixingRule {
    /// Quadratic van der Waals mixing with geometric mean combining
    /// rule corrected by `k_ij` and linear mixing of the covolume.
    #[default]
    Classic,
}

impl FromStr for MixingRule {
    type Err = EosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "classic" | "vdw" | "quadratic" => Ok(Self::Classic),
            _ => Err(EosError::Error(format!("unknown mixing rule `{}`", s))),
        }
    }
}

impl fmt::Display for MixingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Classic => write!(f, "classic"),
        }
    }
}

/// Model options of the cubic equation of state.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct CubicOptions {
    pub mixing_rule: MixingRule,
    /// Apply the volume translation to molar volumes.
    pub volume_correction: bool,
}

/// Peng-Robinson parameters for one ore more substances.
#[derive(Debug)]
pub struct PengRobinsonParameters {
    /// Critical temperature in Kelvin
    tc: Array1<f64>,
    /// Critical pressure in Pascal
    pc: Array1<f64>,
    acentric_factor: Array1<f64>,
    a: Array1<f64>,
    b: Array1<f64>,
    /// Binary interaction parameter
    k_ij: Array2<f64>,
    kappa: Array1<f64>,
    /// Volume translation in m³/mol
    c: Array1<f64>,
    aqueous: Array1<bool>,
    /// Molar weight in units of g/mol
    molarweight: Array1<f64>,
    /// List of pure component records
    pure_records: Vec<PureRecord<PengRobinsonRecord>>,
}

impl std::fmt::Display for PengRobinsonParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.pure_records
            .iter()
            .try_for_each(|pr| writeln!(f, "{}", pr))?;
        writeln!(f, "\nk_ij:\n{}", self.k_ij)
    }
}

impl PengRobinsonParameters {
    /// Build a simple parameter set without binary interaction parameters.
    pub fn new_simple(
        tc: &[f64],
        pc: &[f64],
        acentric_factor: &[f64],
        molarweight: &[f64],
    ) -> Result<Self, ParameterError> {
        if [pc.len(), acentric_factor.len(), molarweight.len()]
            .iter()
            .any(|&l| l != tc.len())
        {
            return Err(ParameterError::IncompatibleParameters(String::from(
                "each component has to have parameters.",
            )));
        }
        let records = (0..tc.len())
            .map(|i| {
                let record = PengRobinsonRecord::new(tc[i], pc[i], acentric_factor[i]);
                PureRecord::new(Identifier::default(), molarweight[i], record)
            })
            .collect();
        PengRobinsonParameters::from_records(records, None)
    }

    pub fn k_ij(&self) -> &Array2<f64> {
        &self.k_ij
    }
}

impl Parameter for PengRobinsonParameters {
    type Pure = PengRobinsonRecord;
    type Binary = f64;

    /// Creates parameters from pure component records.
    fn from_records(
        pure_records: Vec<PureRecord<Self::Pure>>,
        binary_records: Option<Array2<Self::Binary>>,
    ) -> Result<Self, ParameterError> {
        let n = pure_records.len();

        let mut tc = Array1::zeros(n);
        let mut pc = Array1::zeros(n);
        let mut acentric_factor = Array1::zeros(n);
        let mut a = Array1::zeros(n);
        let mut b = Array1::zeros(n);
        let mut c = Array1::zeros(n);
        let mut aqueous = Array1::from_elem(n, false);
        let mut molarweight = Array1::zeros(n);
        let mut kappa_i = Array1::zeros(n);

        for (i, record) in pure_records.iter().enumerate() {
            let r = &record.model_record;
            if !(r.tc > 0.0 && r.pc > 0.0 && r.acentric_factor.is_finite() && r.kappa().is_finite())
            {
                return Err(ParameterError::IncompatibleParameters(format!(
                    "invalid critical properties in {}",
                    record.identifier
                )));
            }
            molarweight[i] = record.molarweight;
            tc[i] = r.tc;
            pc[i] = r.pc;
            acentric_factor[i] = r.acentric_factor;
            a[i] = OMEGA_A * (R * r.tc).powi(2) / r.pc;
            b[i] = OMEGA_B * R * r.tc / r.pc;
            c[i] = r.translation();
            aqueous[i] = r.aqueous;
            kappa_i[i] = r.kappa();
        }

        let k_ij = binary_records.unwrap_or_else(|| Array2::zeros([n; 2]));
        if k_ij.dim() != (n, n) {
            return Err(ParameterError::IncompatibleParameters(format!(
                "binary parameters of shape {:?} for {} components",
                k_ij.dim(),
                n
            )));
        }

        Ok(Self {
            tc,
            pc,
            acentric_factor,
            a,
            b,
            k_ij,
            kappa: kappa_i,
            c,
            aqueous,
            molarweight,
            pure_records,
        })
    }

    fn records(&self) -> (&[PureRecord<PengRobinsonRecord>], Option<&Array2<f64>>) {
        (&self.pure_records, Some(&self.k_ij))
    }
}

/// Mixture parameters at fixed temperature and composition.
struct MixtureParameters {
    /// a of the mixture in Pa m⁶/mol²
    a: f64,
    /// b of the mixture in m³/mol
    b: f64,
    /// sum_j x_j a_ij
    a_i: Array1<f64>,
}

/// The Peng-Robinson equation of state.
#[derive(Debug)]
pub struct PengRobinson {
    /// Parameters
    parameters: Arc<PengRobinsonParameters>,
    options: CubicOptions,
}

impl PengRobinson {
    /// Create a new equation of state from a set of parameters.
    pub fn new(parameters: Arc<PengRobinsonParameters>) -> Self {
        Self::with_options(parameters, CubicOptions::default())
    }

    pub fn with_options(parameters: Arc<PengRobinsonParameters>, options: CubicOptions) -> Self {
        Self {
            parameters,
            options,
        }
    }

    pub fn parameters(&self) -> &Arc<PengRobinsonParameters> {
        &self.parameters
    }

    pub fn options(&self) -> CubicOptions {
        self.options
    }

    fn alpha<D: DualNum<f64> + Copy>(&self, temperature: D, i: usize) -> D {
        let p = &self.parameters;
        let sqrt_tr = (temperature / p.tc[i]).sqrt();
        ((-sqrt_tr + 1.0) * p.kappa[i] + 1.0).powi(2)
    }

    fn mixture_parameters(&self, temperature: f64, molefracs: &Array1<f64>) -> MixtureParameters {
        let p = &self.parameters;
        let n = p.b.len();
        let ai: Array1<f64> =
            Array1::from_shape_fn(n, |i| p.a[i] * self.alpha(temperature, i));
        let sqrt_ai = ai.mapv(f64::sqrt);
        let a_i = match self.options.mixing_rule {
            MixingRule::Classic => Array1::from_shape_fn(n, |i| {
                (0..n)
                    .map(|j| molefracs[j] * sqrt_ai[i] * sqrt_ai[j] * (1.0 - p.k_ij[(i, j)]))
                    .sum()
            }),
        };
        MixtureParameters {
            a: (molefracs * &a_i).sum(),
            b: (molefracs * &p.b).sum(),
            a_i,
        }
    }

    /// Dimensionless parameters A and B of the cubic in Z.
    fn reduced_parameters(
        &self,
        temperature: f64,
        pressure: f64,
        molefracs: &Array1<f64>,
    ) -> (MixtureParameters, f64, f64) {
        let m = self.mixture_parameters(temperature, molefracs);
        let rt = R * temperature;
        let a = m.a * pressure / (rt * rt);
        let b = m.b * pressure / rt;
        (m, a, b)
    }
}

impl fmt::Display for PengRobinson {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Peng-Robinson")
    }
}

impl Components for PengRobinson {
    fn components(&self) -> usize {
        self.parameters.b.len()
    }

    fn subset(&self, component_list: &[usize]) -> EosResult<Self> {
        Ok(Self::with_options(
            Arc::new(self.parameters.subset(component_list)?),
            self.options,
        ))
    }
}

impl EquationOfState for PengRobinson {
    fn molar_weight(&self) -> Array1<f64> {
        self.parameters.molarweight.clone()
    }

    fn compressibility_roots(
        &self,
        temperature: f64,
        pressure: f64,
        molefracs: &Array1<f64>,
    ) -> Vec<f64> {
        let (_, a, b) = self.reduced_parameters(temperature, pressure, molefracs);
        let c2 = b - 1.0;
        let c1 = a - 3.0 * b * b - 2.0 * b;
        let c0 = -(a * b - b * b - b * b * b);
        cubic_roots(c2, c1, c0)
            .into_iter()
            .filter(|&z| z > b)
            .collect()
    }

    fn ln_phi(
        &self,
        temperature: f64,
        pressure: f64,
        molefracs: &Array1<f64>,
        z: f64,
    ) -> Array1<f64> {
        let (m, a, b) = self.reduced_parameters(temperature, pressure, molefracs);
        let p = &self.parameters;
        let log_term = ((z + DELTA_1 * b) / (z + DELTA_2 * b)).ln();
        let ln_z_b = (z - b).ln();
        let prefactor = a / (2.0 * SQRT_2 * b) * log_term;
        Array1::from_shape_fn(p.b.len(), |i| {
            let bi_b = p.b[i] / m.b;
            bi_b * (z - 1.0) - ln_z_b - prefactor * (2.0 * m.a_i[i] / m.a - bi_b)
        })
    }

    fn residual_gibbs_energy(
        &self,
        temperature: f64,
        pressure: f64,
        molefracs: &Array1<f64>,
        z: f64,
    ) -> f64 {
        let (_, a, b) = self.reduced_parameters(temperature, pressure, molefracs);
        z - 1.0
            - (z - b).ln()
            - a / (2.0 * SQRT_2 * b) * ((z + DELTA_1 * b) / (z + DELTA_2 * b)).ln()
    }

    fn pressure<D: DualNum<f64> + Copy>(
        &self,
        temperature: D,
        molar_volume: D,
        molefracs: &Array1<f64>,
    ) -> D {
        let p = &self.parameters;
        let n = p.b.len();
        let sqrt_a: Vec<D> = (0..n)
            .map(|i| (self.alpha(temperature, i) * p.a[i]).sqrt())
            .collect();
        let mut a = D::zero();
        for i in 0..n {
            for j in 0..n {
                a += sqrt_a[i] * sqrt_a[j] * (molefracs[i] * molefracs[j] * (1.0 - p.k_ij[(i, j)]));
            }
        }
        let b = (molefracs * &p.b).sum();
        let v = molar_volume;
        temperature * R / (v - b) - a / (v * v + v * (2.0 * b) - b * b)
    }

    fn volume_shift(&self, molefracs: &Array1<f64>) -> f64 {
        if self.options.volume_correction {
            (molefracs * &self.parameters.c).sum()
        } else {
            0.0
        }
    }

    fn aqueous_fraction(&self, molefracs: &Array1<f64>) -> f64 {
        molefracs
            .iter()
            .zip(self.parameters.aqueous.iter())
            .filter(|(_, &aq)| aq)
            .map(|(x, _)| x)
            .sum()
    }

    fn wilson_k(&self, temperature: f64, pressure: f64) -> Array1<f64> {
        let p = &self.parameters;
        Array1::from_shape_fn(p.tc.len(), |i| {
            p.pc[i] / pressure
                * (5.373 * (1.0 + p.acentric_factor[i]) * (1.0 - p.tc[i] / temperature)).exp()
        })
    }
}

/// Real roots of `z³ + c2 z² + c1 z + c0` in ascending order.
///
/// The analytic solution is polished by Newton steps.
pub fn cubic_roots(c2: f64, c1: f64, c0: f64) -> Vec<f64> {
    let q = (3.0 * c1 - c2 * c2) / 9.0;
    let r = (9.0 * c2 * c1 - 27.0 * c0 - 2.0 * c2.powi(3)) / 54.0;
    let disc = q.powi(3) + r * r;

    let mut roots = if disc > 0.0 {
        let sqrt_disc = disc.sqrt();
        let s = (r + sqrt_disc).cbrt();
        let t = (r - sqrt_disc).cbrt();
        vec![s + t - c2 / 3.0]
    } else if q == 0.0 {
        vec![-c2 / 3.0]
    } else {
        let theta = (r / (-q.powi(3)).sqrt()).clamp(-1.0, 1.0).acos();
        let m = 2.0 * (-q).sqrt();
        (0..3)
            .map(|k| m * ((theta + 2.0 * PI * k as f64) / 3.0).cos() - c2 / 3.0)
            .collect()
    };

    for z in roots.iter_mut() {
        for _ in 0..NEWTON_STEPS {
            let x = Dual64::from_re(*z).derivative();
            let f = ((x + c2) * x + c1) * x + c0;
            if f.eps == 0.0 {
                break;
            }
            *z -= f.re / f.eps;
        }
    }
    roots.sort_by(f64::total_cmp);
    roots.dedup_by(|a, b| (*a - *b).abs() < 1e-12);
    roots
}
