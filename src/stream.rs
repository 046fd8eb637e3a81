//! A fluid with boundary conditions and the result of its flash.
use crate::mixture::Mixture;
use crate::units::{MassFlowUnit, PressureUnit, TemperatureUnit};
use indexmap::IndexMap;
use petroflash_core::cubic::PengRobinson;
use petroflash_core::si::*;
use petroflash_core::{EosError, EosResult, PhaseEquilibrium, PhaseType};
use std::fmt;

/// Properties of one phase of an executed stream.
#[derive(Clone, Debug)]
pub struct PhaseResult {
    pub phase_type: PhaseType,
    /// Fraction of the total amount of substance.
    pub mole_fraction: f64,
    /// Fraction of the total mass.
    pub mass_fraction: f64,
    pub molar_flow_rate: MoleFlowRate,
    pub mass_flow_rate: MassFlowRate,
    pub compressibility: f64,
    /// Molar volume, volume translated if enabled in the mixture.
    pub molar_volume: MolarVolume,
    pub mass_density: MassDensity,
    pub molar_weight: MolarWeight,
    /// Mole fractions by component name.
    pub composition: IndexMap<String, f64>,
}

#[derive(Clone, Debug)]
struct StreamResult {
    phase_equilibrium: PhaseEquilibrium<PengRobinson>,
    phases: Vec<PhaseResult>,
}

/// A mixture at given temperature, pressure and mass flow rate.
#[derive(Clone, Debug)]
pub struct Stream {
    name: String,
    mixture: Mixture,
    temperature: Temperature,
    pressure: Pressure,
    flow_rate: MassFlowRate,
    result: Option<StreamResult>,
}

impl Stream {
    /// Stream of a snapshot of `mixture` at 15 °C and 1.01325 bar
    /// without flow.
    pub fn new(name: &str, mixture: &Mixture) -> Self {
        Self {
            name: name.to_string(),
            mixture: mixture.clone(),
            temperature: 15.0 * CELSIUS,
            pressure: 1.01325 * BAR,
            flow_rate: 0.0 * KILOGRAM / SECOND,
            result: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mixture(&self) -> &Mixture {
        &self.mixture
    }

    /// Set the pressure. A previous result is discarded.
    pub fn set_pressure(&mut self, value: f64, unit: &str) -> EosResult<()> {
        self.pressure = unit.parse::<PressureUnit>()?.quantity(value);
        self.result = None;
        Ok(())
    }

    /// Set the temperature. A previous result is discarded.
    pub fn set_temperature(&mut self, value: f64, unit: &str) -> EosResult<()> {
        self.temperature = unit.parse::<TemperatureUnit>()?.quantity(value);
        self.result = None;
        Ok(())
    }

    /// Set the mass flow rate. A previous result is discarded.
    pub fn set_flow_rate(&mut self, value: f64, unit: &str) -> EosResult<()> {
        self.flow_rate = unit.parse::<MassFlowUnit>()?.quantity(value);
        self.result = None;
        Ok(())
    }

    pub fn temperature(&self) -> Temperature {
        self.temperature
    }

    pub fn pressure(&self) -> Pressure {
        self.pressure
    }

    pub fn flow_rate(&self) -> MassFlowRate {
        self.flow_rate
    }

    /// Flash the mixture at the current conditions.
    ///
    /// A previous result is discarded, also if the flash fails.
    pub fn execute(&mut self) -> EosResult<()> {
        self.result = None;
        let phase_equilibrium = self
            .mixture
            .tp_flash(self.temperature, self.pressure, None)?;
        let phases = self.phase_results(&phase_equilibrium)?;
        self.result = Some(StreamResult {
            phase_equilibrium,
            phases,
        });
        Ok(())
    }

    /// Same as [Stream::execute].
    pub fn run(&mut self) -> EosResult<()> {
        self.execute()
    }

    fn phase_results(
        &self,
        phase_equilibrium: &PhaseEquilibrium<PengRobinson>,
    ) -> EosResult<Vec<PhaseResult>> {
        let molar_weight = self.mixture.molar_weight()?;
        let molar_flow_rate: MoleFlowRate = self.flow_rate / molar_weight;
        let names = self.mixture.components().names();
        Ok(phase_equilibrium
            .states()
            .iter()
            .zip(phase_equilibrium.phase_fractions().iter())
            .zip(phase_equilibrium.phase_types().iter())
            .map(|((s, &beta), &phase_type)| {
                let mass_fraction = (beta * s.molar_weight() / molar_weight).into_value();
                PhaseResult {
                    phase_type,
                    mole_fraction: beta,
                    mass_fraction,
                    molar_flow_rate: beta * molar_flow_rate,
                    mass_flow_rate: mass_fraction * self.flow_rate,
                    compressibility: s.compressibility,
                    molar_volume: s.molar_volume(),
                    mass_density: s.mass_density(),
                    molar_weight: s.molar_weight(),
                    composition: names
                        .iter()
                        .zip(s.molefracs.iter())
                        .map(|(&n, &x)| (n.to_string(), x))
                        .collect(),
                }
            })
            .collect())
    }

    fn result(&self) -> EosResult<&StreamResult> {
        self.result
            .as_ref()
            .ok_or_else(|| EosError::NotExecuted(self.name.clone()))
    }

    /// Check for a phase of the given kind, e.g. `"gas"`, `"oil"` or `"aqueous"`.
    pub fn has_phase_type(&self, phase_type: &str) -> EosResult<bool> {
        let phase_type = phase_type.parse()?;
        Ok(self.result()?.phase_equilibrium.has_phase_type(phase_type))
    }

    /// Results of the first phase of the given kind.
    pub fn phase(&self, phase_type: &str) -> EosResult<Option<&PhaseResult>> {
        let phase_type: PhaseType = phase_type.parse()?;
        Ok(self
            .result()?
            .phases
            .iter()
            .find(|p| p.phase_type == phase_type))
    }

    /// Mole fraction of a component in the first phase of the given kind.
    ///
    /// The component is looked up by name, formula, alias or CAS number.
    /// [None] if the stream has no such phase.
    pub fn phase_mole_fraction(&self, phase_type: &str, component: &str) -> EosResult<Option<f64>> {
        let phase = self.phase(phase_type)?;
        let name = self
            .mixture
            .components()
            .get(component)
            .ok_or_else(|| EosError::UnknownComponent(component.to_string()))?
            .name();
        Ok(phase.and_then(|p| p.composition.get(name).copied()))
    }

    pub fn phases(&self) -> EosResult<&[PhaseResult]> {
        Ok(&self.result()?.phases)
    }

    pub fn number_of_phases(&self) -> EosResult<usize> {
        Ok(self.result()?.phases.len())
    }

    pub fn flash_result(&self) -> EosResult<&PhaseEquilibrium<PengRobinson>> {
        Ok(&self.result()?.phase_equilibrium)
    }
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "stream `{}`", self.name)?;
        writeln!(
            f,
            "T = {:.2} °C, p = {:.5}, flow rate = {:.3}",
            self.temperature / CELSIUS,
            self.pressure,
            self.flow_rate
        )?;
        let Some(result) = &self.result else {
            return writeln!(f, "not executed");
        };
        let phases = &result.phases;
        write!(f, "{:<24}", "")?;
        for p in phases {
            write!(f, "{:>16}", p.phase_type.to_string())?;
        }
        writeln!(f)?;
        let mut row = |label: &str, values: Vec<String>| {
            write!(f, "{:<24}", label)?;
            for v in values {
                write!(f, "{:>16}", v)?;
            }
            writeln!(f)
        };
        row("mole fraction", phases.iter().map(|p| format!("{:.6}", p.mole_fraction)).collect())?;
        row("mass fraction", phases.iter().map(|p| format!("{:.6}", p.mass_fraction)).collect())?;
        row(
            "mass flow [kg/h]",
            phases
                .iter()
                .map(|p| format!("{:.3}", p.mass_flow_rate.convert_into(KILOGRAM / HOUR)))
                .collect(),
        )?;
        row(
            "density [kg/m³]",
            phases
                .iter()
                .map(|p| format!("{:.3}", p.mass_density.convert_into(KILOGRAM / CUBIC_METER)))
                .collect(),
        )?;
        row(
            "Z",
            phases.iter().map(|p| format!("{:.5}", p.compressibility)).collect(),
        )?;
        row(
            "M [g/mol]",
            phases
                .iter()
                .map(|p| format!("{:.4}", p.molar_weight.convert_into(GRAM / MOL)))
                .collect(),
        )?;
        for name in self.mixture.components().names() {
            row(
                name,
                phases
                    .iter()
                    .map(|p| format!("{:.4e}", p.composition.get(name).copied().unwrap_or(0.0)))
                    .collect(),
            )?;
        }
        Ok(())
    }
}

/// Execute independent streams in parallel.
///
/// With `threads`, a dedicated thread pool of that size is used.
#[cfg(feature = "rayon")]
pub fn execute_streams(
    streams: &mut [Stream],
    threads: Option<usize>,
) -> EosResult<Vec<EosResult<()>>> {
    use rayon::prelude::*;
    let run = |streams: &mut [Stream]| streams.par_iter_mut().map(Stream::execute).collect();
    match threads {
        Some(n) => {
            let pool = rayon::ThreadPoolBuilder::new().num_threads(n).build()?;
            Ok(pool.install(|| run(streams)))
        }
        None => Ok(run(streams)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn gas_condensate() -> EosResult<Mixture> {
        let mut mixture = Mixture::new();
        mixture.add_component("methane", 0.5)?;
        mixture.add_component("n-decane", 0.5)?;
        Ok(mixture)
    }

    #[test]
    fn defaults() -> EosResult<()> {
        let stream = Stream::new("feed", &gas_condensate()?);
        assert_relative_eq!(stream.temperature().convert_into(KELVIN), 288.15);
        assert_relative_eq!(stream.pressure().convert_into(PASCAL), 101325.0);
        assert_eq!(stream.flow_rate().convert_into(KILOGRAM / SECOND), 0.0);
        assert!(matches!(stream.has_phase_type("gas"), Err(EosError::NotExecuted(_))));
        assert!(matches!(stream.number_of_phases(), Err(EosError::NotExecuted(_))));
        Ok(())
    }

    #[test]
    fn phase_results() -> EosResult<()> {
        let mut stream = Stream::new("feed", &gas_condensate()?);
        stream.set_temperature(344.0, "K")?;
        stream.set_pressure(50.0, "bara")?;
        stream.set_flow_rate(1000.0, "kg/hr")?;
        stream.execute()?;
        assert_eq!(stream.number_of_phases()?, 2);
        assert!(stream.has_phase_type("gas")?);
        assert!(stream.has_phase_type("oil")?);
        assert!(!stream.has_phase_type("aqueous")?);

        let phases = stream.phases()?;
        let mass_flow: f64 = phases
            .iter()
            .map(|p| p.mass_flow_rate.convert_into(KILOGRAM / HOUR))
            .sum();
        assert_relative_eq!(mass_flow, 1000.0, max_relative = 1e-8);
        let mass_fraction: f64 = phases.iter().map(|p| p.mass_fraction).sum();
        assert_relative_eq!(mass_fraction, 1.0, max_relative = 1e-8);

        let gas = stream.phase("gas")?.expect("gas phase");
        assert!(gas.composition["methane"] > 0.9);
        for query in ["methane", "CH4", "C1", "74-82-8"] {
            assert_eq!(
                stream.phase_mole_fraction("gas", query)?,
                Some(gas.composition["methane"])
            );
        }
        assert_eq!(stream.phase_mole_fraction("aqueous", "CH4")?, None);
        assert!(matches!(
            stream.phase_mole_fraction("gas", "H2O"),
            Err(EosError::UnknownComponent(_))
        ));
        let oil = stream.phase("oil")?.expect("oil phase");
        assert!(oil.mass_density > gas.mass_density);
        assert!(stream.to_string().contains("methane"));
        Ok(())
    }

    #[test]
    fn new_conditions_clear_result() -> EosResult<()> {
        let mut stream = Stream::new("feed", &gas_condensate()?);
        stream.set_temperature(344.0, "K")?;
        stream.set_pressure(50.0, "bara")?;
        stream.execute()?;
        assert!(stream.has_phase_type("oil")?);

        stream.set_pressure(1.0, "bara")?;
        assert!(matches!(stream.has_phase_type("oil"), Err(EosError::NotExecuted(_))));
        stream.execute()?;
        stream.set_temperature(600.0, "K")?;
        assert!(matches!(stream.number_of_phases(), Err(EosError::NotExecuted(_))));
        stream.execute()?;
        stream.set_flow_rate(10.0, "kg/s")?;
        assert!(matches!(stream.phases(), Err(EosError::NotExecuted(_))));

        stream.execute()?;
        assert_eq!(stream.number_of_phases()?, 1);
        assert!(!stream.has_phase_type("oil")?);
        Ok(())
    }

    #[test]
    fn repeated_execution_is_identical() -> EosResult<()> {
        let mut stream = Stream::new("feed", &gas_condensate()?);
        stream.set_temperature(344.0, "K")?;
        stream.set_pressure(50.0, "bara")?;
        stream.set_flow_rate(1000.0, "kg/hr")?;
        stream.execute()?;
        let first = stream.phases()?.to_vec();
        let report = stream.to_string();
        stream.execute()?;
        let second = stream.phases()?;
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second) {
            assert_eq!(a.phase_type, b.phase_type);
            assert_eq!(a.mole_fraction, b.mole_fraction);
            assert_eq!(a.mass_density, b.mass_density);
            assert_eq!(a.composition, b.composition);
        }
        assert_eq!(report, stream.to_string());
        Ok(())
    }

    #[test]
    fn failed_execution_clears_result() -> EosResult<()> {
        let mut stream = Stream::new("feed", &gas_condensate()?);
        stream.execute()?;
        assert!(stream.flash_result().is_ok());
        assert!(matches!(
            stream.set_pressure(1.0, "inHg"),
            Err(EosError::UnsupportedUnit { .. })
        ));
        stream.set_pressure(-1.0, "bara")?;
        assert!(stream.execute().is_err());
        assert!(matches!(stream.flash_result(), Err(EosError::NotExecuted(_))));
        Ok(())
    }
}
