//! Description of a single homogeneous phase.
//!
//! A phase is defined by
//! * a temperature
//! * a pressure
//! * the mole fractions
//! * the root of the cubic equation of state that represents it
//!
//! Fugacity coefficients are evaluated once on construction.
use crate::equation_of_state::EquationOfState;
use crate::errors::{EosError, EosResult};
use crate::si::*;
use ndarray::Array1;
use std::fmt;
use std::sync::Arc;

mod phase_type;
pub use phase_type::PhaseType;

/// Selection among multiple roots of the cubic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Root {
    /// The largest compressibility factor.
    Vapor,
    /// The smallest compressibility factor above the covolume.
    Liquid,
    /// The root with the lowest Gibbs energy.
    MinimumGibbs,
}

/// Thermodynamic state of a single phase.
///
/// The state is specified by temperature, pressure and composition. The
/// state also contains a reference to the equation of state used to create it.
#[derive(Debug)]
pub struct State<E> {
    /// Equation of state
    pub eos: Arc<E>,
    /// Temperature $T$
    pub temperature: Temperature,
    /// Pressure $p$
    pub pressure: Pressure,
    /// Mole fractions $x_i$
    pub molefracs: Array1<f64>,
    /// Compressibility factor $Z$ of the selected root
    pub compressibility: f64,
    root: Root,
    ln_phi: Array1<f64>,
}

impl<E> Clone for State<E> {
    fn clone(&self) -> Self {
        Self {
            eos: self.eos.clone(),
            temperature: self.temperature,
            pressure: self.pressure,
            molefracs: self.molefracs.clone(),
            compressibility: self.compressibility,
            root: self.root,
            ln_phi: self.ln_phi.clone(),
        }
    }
}

impl<E: EquationOfState> fmt::Display for State<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "T = {:.5}, p = {:.5}, Z = {:.5}, x = {:.5}",
            self.temperature, self.pressure, self.compressibility, self.molefracs
        )
    }
}

impl<E: EquationOfState> State<E> {
    /// Return a new `State` for given temperature, pressure and mole fractions.
    pub fn new_tpx(
        eos: &Arc<E>,
        temperature: Temperature,
        pressure: Pressure,
        molefracs: &Array1<f64>,
        root: Root,
    ) -> EosResult<Self> {
        if molefracs.len() != eos.components() {
            return Err(EosError::IncompatibleComponents(
                eos.components(),
                molefracs.len(),
            ));
        }
        let t = temperature.convert_into(KELVIN);
        let p = pressure.convert_into(PASCAL);
        if !(t.is_finite() && t > 0.0) {
            return Err(EosError::InvalidState(
                String::from("State"),
                String::from("temperature"),
                t,
            ));
        }
        if !(p.is_finite() && p > 0.0) {
            return Err(EosError::InvalidState(
                String::from("State"),
                String::from("pressure"),
                p,
            ));
        }
        let sum = molefracs.sum();
        if molefracs.iter().any(|&x| !x.is_finite() || x < 0.0) || sum <= 0.0 {
            return Err(EosError::InvalidComposition(format!(
                "mole fractions {} are not a valid composition",
                molefracs
            )));
        }
        let molefracs = molefracs / sum;
        let compressibility = eos.compressibility_factor(t, p, &molefracs, root)?;
        let ln_phi = eos.ln_phi(t, p, &molefracs, compressibility);
        Ok(Self {
            eos: eos.clone(),
            temperature,
            pressure,
            molefracs,
            compressibility,
            root,
            ln_phi,
        })
    }

    /// Root of the cubic that was selected on construction.
    pub fn root(&self) -> Root {
        self.root
    }

    /// Logarithms of the fugacity coefficients $\ln\varphi_i$.
    pub fn ln_phi(&self) -> &Array1<f64> {
        &self.ln_phi
    }

    /// Logarithm of the reduced fugacity $\ln(x_i\varphi_i)$.
    ///
    /// Components that are absent from the phase yield negative infinity.
    pub fn ln_fugacity_coefficient_product(&self) -> Array1<f64> {
        &self.molefracs.mapv(f64::ln) + &self.ln_phi
    }

    /// Molar volume without volume translation.
    fn eos_molar_volume(&self) -> f64 {
        self.compressibility * RGAS.convert_into(JOULE / (MOL * KELVIN))
            * self.temperature.convert_into(KELVIN)
            / self.pressure.convert_into(PASCAL)
    }

    /// Molar volume $v$, including the volume translation if enabled in
    /// the equation of state.
    pub fn molar_volume(&self) -> MolarVolume {
        (self.eos_molar_volume() - self.eos.volume_shift(&self.molefracs)) * CUBIC_METER / MOL
    }

    /// Molar density $\rho=1/v$.
    pub fn density(&self) -> Density {
        1.0 / self.molar_volume()
    }

    /// Mean molar weight $M=\sum_ix_iM_i$.
    pub fn molar_weight(&self) -> MolarWeight {
        (&self.molefracs * &self.eos.molar_weight()).sum() * GRAM / MOL
    }

    /// Mass density $\rho^{(m)}=M/v$.
    pub fn mass_density(&self) -> MassDensity {
        self.molar_weight() / self.molar_volume()
    }

    /// Mole fraction of aqueous components.
    pub fn aqueous_fraction(&self) -> f64 {
        self.eos.aqueous_fraction(&self.molefracs)
    }

    /// Phase identification parameter evaluated at the untranslated volume.
    pub fn phase_identification_parameter(&self) -> f64 {
        self.eos.phase_identification_parameter(
            self.temperature.convert_into(KELVIN),
            self.eos_molar_volume(),
            &self.molefracs,
        )
    }

    /// Molar Gibbs energy of mixing divided by RT,
    /// $\sum_i x_i\left(\ln x_i + \ln\varphi_i\right)$.
    pub fn reduced_gibbs_energy(&self) -> f64 {
        self.molefracs
            .iter()
            .zip(self.ln_phi.iter())
            .filter(|(&x, _)| x > 0.0)
            .map(|(&x, &l)| x * (x.ln() + l))
            .sum()
    }

    /// Classify the phase as vapor, hydrocarbon liquid or aqueous liquid.
    pub fn phase_type(&self) -> PhaseType {
        PhaseType::classify(self.phase_identification_parameter(), self.aqueous_fraction())
    }

    /// Re-evaluate the state with the same root selection at a new composition.
    pub fn update_molefracs(&self, molefracs: &Array1<f64>) -> EosResult<Self> {
        Self::new_tpx(
            &self.eos,
            self.temperature,
            self.pressure,
            molefracs,
            self.root,
        )
    }

    /// Re-evaluate the state with a different root of the cubic.
    pub fn update_root(&self, root: Root) -> EosResult<Self> {
        Self::new_tpx(
            &self.eos,
            self.temperature,
            self.pressure,
            &self.molefracs,
            root,
        )
    }
}
