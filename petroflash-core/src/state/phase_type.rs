use super::{Root, State};
use crate::equation_of_state::EquationOfState;
use crate::errors::{EosError, EosResult};
use crate::si::{MolarVolume, Pressure, Temperature};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Mole fraction of aqueous components above which a liquid is aqueous.
const AQUEOUS_FRACTION: f64 = 0.5;

/// The kinds of phases that can appear in a flash result.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PhaseType {
    Vapor,
    LiquidHydrocarbon,
    Aqueous,
}

impl PhaseType {
    /// All phase types in reporting order.
    pub const ALL: [PhaseType; 3] = [Self::Vapor, Self::LiquidHydrocarbon, Self::Aqueous];

    /// Root of the cubic that represents this kind of phase.
    pub fn root(self) -> Root {
        match self {
            Self::Vapor => Root::Vapor,
            Self::LiquidHydrocarbon | Self::Aqueous => Root::Liquid,
        }
    }

    /// Classify a phase from its phase identification parameter and
    /// the mole fraction of aqueous components.
    pub fn classify(phase_identification_parameter: f64, aqueous_fraction: f64) -> Self {
        if phase_identification_parameter < 1.0 {
            Self::Vapor
        } else if aqueous_fraction > AQUEOUS_FRACTION {
            Self::Aqueous
        } else {
            Self::LiquidHydrocarbon
        }
    }

    /// Evaluate a phase of this kind at the given conditions.
    pub fn state<E: EquationOfState>(
        self,
        eos: &Arc<E>,
        temperature: Temperature,
        pressure: Pressure,
        molefracs: &Array1<f64>,
    ) -> EosResult<State<E>> {
        State::new_tpx(eos, temperature, pressure, molefracs, self.root())
    }

    /// Logarithms of the fugacity coefficients of a phase of this kind.
    pub fn ln_phi<E: EquationOfState>(
        self,
        eos: &Arc<E>,
        temperature: Temperature,
        pressure: Pressure,
        molefracs: &Array1<f64>,
    ) -> EosResult<Array1<f64>> {
        Ok(self
            .state(eos, temperature, pressure, molefracs)?
            .ln_phi()
            .clone())
    }

    /// Molar volume of a phase of this kind.
    pub fn molar_volume<E: EquationOfState>(
        self,
        eos: &Arc<E>,
        temperature: Temperature,
        pressure: Pressure,
        molefracs: &Array1<f64>,
    ) -> EosResult<MolarVolume> {
        Ok(self
            .state(eos, temperature, pressure, molefracs)?
            .molar_volume())
    }
}

impl fmt::Display for PhaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vapor => write!(f, "gas"),
            Self::LiquidHydrocarbon => write!(f, "oil"),
            Self::Aqueous => write!(f, "aqueous"),
        }
    }
}

impl FromStr for PhaseType {
    type Err = EosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gas" | "vapor" | "vapour" => Ok(Self::Vapor),
            "oil" | "liquid" | "hydrocarbon" | "liquid-hydrocarbon" | "liquid_hydrocarbon"
            | "liquidhydrocarbon" => Ok(Self::LiquidHydrocarbon),
            "aqueous" | "water" => Ok(Self::Aqueous),
            _ => Err(EosError::Error(format!("unknown phase type `{}`", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        assert_eq!(PhaseType::classify(0.6, 0.9), PhaseType::Vapor);
        assert_eq!(PhaseType::classify(3.0, 0.9), PhaseType::Aqueous);
        assert_eq!(PhaseType::classify(3.0, 0.1), PhaseType::LiquidHydrocarbon);
    }

    #[test]
    fn parse_tags() {
        assert_eq!("gas".parse::<PhaseType>().ok(), Some(PhaseType::Vapor));
        assert_eq!("Oil".parse::<PhaseType>().ok(), Some(PhaseType::LiquidHydrocarbon));
        assert_eq!("aqueous".parse::<PhaseType>().ok(), Some(PhaseType::Aqueous));
        assert_eq!("vapor".parse::<PhaseType>().ok(), Some(PhaseType::Vapor));
        for tag in ["liquid-hydrocarbon", "Liquid_Hydrocarbon", "LiquidHydrocarbon"] {
            assert_eq!(tag.parse::<PhaseType>().ok(), Some(PhaseType::LiquidHydrocarbon));
        }
        assert!("plasma".parse::<PhaseType>().is_err());
        for p in PhaseType::ALL {
            assert_eq!(p.to_string().parse::<PhaseType>().ok(), Some(p));
        }
    }
}
