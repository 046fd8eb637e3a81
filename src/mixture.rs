use crate::components::{ComponentDatabase, ComponentTable, TbpFraction};
use ndarray::Array1;
use petroflash_core::cubic::{CubicOptions, MixingRule, PengRobinson};
use petroflash_core::si::{MolarWeight, Pressure, Temperature, GRAM, MOL};
use petroflash_core::{EosError, EosResult, FlashOptions, PhaseEquilibrium};
use std::fmt;
use std::sync::Arc;

const COMPOSITION_TOL: f64 = 1e-6;

/// Composition and model options of a fluid.
///
/// The equation of state is created from an immutable snapshot of the
/// mixture for every flash calculation.
#[derive(Clone, Debug)]
pub struct Mixture {
    table: ComponentTable,
    molefracs: Vec<f64>,
    mixing_rule: MixingRule,
    multiphase_check: bool,
    volume_correction: bool,
}

impl Default for Mixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Mixture {
    pub fn new() -> Self {
        Self::from_table(ComponentTable::new())
    }

    /// Mixture whose defined components are taken from `database`.
    pub fn with_database(database: Arc<ComponentDatabase>) -> Self {
        Self::from_table(ComponentTable::with_database(database))
    }

    pub fn from_table(table: ComponentTable) -> Self {
        let n = table.len();
        Self {
            table,
            molefracs: vec![0.0; n],
            mixing_rule: MixingRule::default(),
            multiphase_check: false,
            volume_correction: false,
        }
    }

    fn add(&mut self, index: usize, mole_fraction: f64) {
        if index >= self.molefracs.len() {
            self.molefracs.resize(index + 1, 0.0);
        }
        self.molefracs[index] += mole_fraction;
    }

    fn check_fraction(name: &str, mole_fraction: f64) -> EosResult<()> {
        if mole_fraction.is_finite() && mole_fraction >= 0.0 {
            Ok(())
        } else {
            Err(EosError::InvalidComposition(format!(
                "mole fraction of `{}` is {}",
                name, mole_fraction
            )))
        }
    }

    /// Add a component of the database. Adding a component twice adds up
    /// the mole fractions.
    pub fn add_component(&mut self, name: &str, mole_fraction: f64) -> EosResult<()> {
        Self::check_fraction(name, mole_fraction)?;
        let index = self.table.register_defined(name)?;
        self.add(index, mole_fraction);
        Ok(())
    }

    /// Add a pseudo-component characterized from its molar mass and
    /// relative density.
    pub fn add_tbp_fraction(
        &mut self,
        name: &str,
        mole_fraction: f64,
        molar_weight: MolarWeight,
        relative_density: f64,
    ) -> EosResult<()> {
        Self::check_fraction(name, mole_fraction)?;
        let fraction = TbpFraction::new(name, molar_weight, relative_density);
        let index = self.table.register_pseudo(fraction)?;
        self.add(index, mole_fraction);
        Ok(())
    }

    /// Select the mixing rule by name.
    pub fn set_mixing_rule(&mut self, mixing_rule: &str) -> EosResult<()> {
        self.mixing_rule = mixing_rule.parse()?;
        Ok(())
    }

    pub fn mixing_rule(&self) -> MixingRule {
        self.mixing_rule
    }

    /// Allow more than two phases in flash calculations.
    pub fn set_multiphase_check(&mut self, multiphase_check: bool) {
        self.multiphase_check = multiphase_check;
    }

    pub fn multiphase_check(&self) -> bool {
        self.multiphase_check
    }

    /// Apply the volume translation to reported molar volumes and densities.
    pub fn use_volume_correction(&mut self, volume_correction: bool) {
        self.volume_correction = volume_correction;
    }

    pub fn volume_correction(&self) -> bool {
        self.volume_correction
    }

    pub fn components(&self) -> &ComponentTable {
        &self.table
    }

    pub fn number_of_components(&self) -> usize {
        self.table.len()
    }

    pub fn molefracs(&self) -> Array1<f64> {
        Array1::from_vec(self.molefracs.clone())
    }

    pub fn mole_fraction(&self, name: &str) -> Option<f64> {
        self.table.index_of(name).map(|i| self.molefracs[i])
    }

    /// Mole fractions normalized to one.
    ///
    /// The sum of the mole fractions has to be one within 1e-6.
    pub fn validate(&self) -> EosResult<Array1<f64>> {
        if self.table.is_empty() {
            return Err(EosError::InvalidComposition(String::from(
                "the mixture has no components",
            )));
        }
        let sum: f64 = self.molefracs.iter().sum();
        if (sum - 1.0).abs() > COMPOSITION_TOL {
            return Err(EosError::InvalidComposition(format!(
                "mole fractions sum to {}",
                sum
            )));
        }
        Ok(self.molefracs() / sum)
    }

    /// Mean molar weight of the mixture.
    pub fn molar_weight(&self) -> EosResult<MolarWeight> {
        let x = self.validate()?;
        let mw: f64 = self
            .table
            .components()
            .iter()
            .zip(x.iter())
            .map(|(c, &x)| x * c.record().molarweight)
            .sum();
        Ok(mw * GRAM / MOL)
    }

    pub fn cubic_options(&self) -> CubicOptions {
        CubicOptions {
            mixing_rule: self.mixing_rule,
            volume_correction: self.volume_correction,
        }
    }

    /// Peng-Robinson equation of state of all components.
    pub fn equation_of_state(&self) -> EosResult<Arc<PengRobinson>> {
        let parameters = self.table.parameters()?;
        Ok(Arc::new(PengRobinson::with_options(
            Arc::new(parameters),
            self.cubic_options(),
        )))
    }

    pub fn flash_options(&self) -> FlashOptions {
        FlashOptions::new().multiphase_check(self.multiphase_check)
    }

    /// Isothermal-isobaric flash of the mixture.
    pub fn tp_flash(
        &self,
        temperature: Temperature,
        pressure: Pressure,
        options: Option<FlashOptions>,
    ) -> EosResult<PhaseEquilibrium<PengRobinson>> {
        let x = self.validate()?;
        let eos = self.equation_of_state()?;
        let options = options.unwrap_or_else(|| self.flash_options());
        PhaseEquilibrium::tp_flash(&eos, temperature, pressure, &x, options)
    }
}

impl fmt::Display for Mixture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "mixing rule: {}, multiphase check: {}, volume correction: {}",
            self.mixing_rule, self.multiphase_check, self.volume_correction
        )?;
        for (c, x) in self.table.components().iter().zip(self.molefracs.iter()) {
            writeln!(f, "{:<24} {:.9}", c.name(), x)?;
        }
        Ok(())
    }
}
