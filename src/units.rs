//! Unit tags of stream boundary conditions.
//!
//! Tags are parsed from the strings commonly used in process simulation
//! input and converted to SI quantities.
use petroflash_core::si::*;
use petroflash_core::EosError;
use std::str::FromStr;

fn unsupported(quantity: &str, unit: &str) -> EosError {
    EosError::UnsupportedUnit {
        quantity: quantity.to_string(),
        unit: unit.to_string(),
    }
}

/// Units of pressure. Gauge pressures are relative to one standard atmosphere.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PressureUnit {
    Bara,
    Barg,
    Pascal,
    KiloPascal,
    MegaPascal,
    Atmosphere,
    Psia,
    Psig,
}

impl FromStr for PressureUnit {
    type Err = EosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "bara" | "bar" => Ok(Self::Bara),
            "barg" => Ok(Self::Barg),
            "Pa" | "pa" => Ok(Self::Pascal),
            "kPa" | "kpa" => Ok(Self::KiloPascal),
            "MPa" | "mpa" => Ok(Self::MegaPascal),
            "atm" => Ok(Self::Atmosphere),
            "psi" | "psia" => Ok(Self::Psia),
            "psig" => Ok(Self::Psig),
            _ => Err(unsupported("pressure", s)),
        }
    }
}

impl PressureUnit {
    pub fn quantity(self, value: f64) -> Pressure {
        match self {
            Self::Bara => value * BAR,
            Self::Barg => value * BAR + ATMOSPHERE,
            Self::Pascal => value * PASCAL,
            Self::KiloPascal => value * KILO * PASCAL,
            Self::MegaPascal => value * MEGA * PASCAL,
            Self::Atmosphere => value * ATMOSPHERE,
            Self::Psia => value * PSI,
            Self::Psig => value * PSI + ATMOSPHERE,
        }
    }

    pub fn value(self, pressure: Pressure) -> f64 {
        match self {
            Self::Bara => pressure.convert_into(BAR),
            Self::Barg => (pressure - ATMOSPHERE).convert_into(BAR),
            Self::Pascal => pressure.convert_into(PASCAL),
            Self::KiloPascal => pressure.convert_into(KILO * PASCAL),
            Self::MegaPascal => pressure.convert_into(MEGA * PASCAL),
            Self::Atmosphere => pressure.convert_into(ATMOSPHERE),
            Self::Psia => pressure.convert_into(PSI),
            Self::Psig => (pressure - ATMOSPHERE).convert_into(PSI),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TemperatureUnit {
    Kelvin,
    Celsius,
    Fahrenheit,
}

impl FromStr for TemperatureUnit {
    type Err = EosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "K" => Ok(Self::Kelvin),
            "C" | "°C" | "degC" => Ok(Self::Celsius),
            "F" | "°F" | "degF" => Ok(Self::Fahrenheit),
            _ => Err(unsupported("temperature", s)),
        }
    }
}

impl TemperatureUnit {
    pub fn quantity(self, value: f64) -> Temperature {
        match self {
            Self::Kelvin => value * KELVIN,
            Self::Celsius => value * CELSIUS,
            Self::Fahrenheit => value * FAHRENHEIT,
        }
    }

    pub fn value(self, temperature: Temperature) -> f64 {
        match self {
            Self::Kelvin => temperature.convert_into(KELVIN),
            Self::Celsius => temperature / CELSIUS,
            Self::Fahrenheit => temperature / FAHRENHEIT,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MassFlowUnit {
    KilogramPerSecond,
    KilogramPerMinute,
    KilogramPerHour,
    KilogramPerDay,
    TonnePerHour,
    TonnePerDay,
    PoundPerHour,
}

impl FromStr for MassFlowUnit {
    type Err = EosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "kg/s" | "kg/sec" => Ok(Self::KilogramPerSecond),
            "kg/min" => Ok(Self::KilogramPerMinute),
            "kg/h" | "kg/hr" => Ok(Self::KilogramPerHour),
            "kg/d" | "kg/day" => Ok(Self::KilogramPerDay),
            "t/h" | "tonnes/hr" => Ok(Self::TonnePerHour),
            "t/d" | "tonnes/day" => Ok(Self::TonnePerDay),
            "lb/h" | "lb/hr" => Ok(Self::PoundPerHour),
            _ => Err(unsupported("mass flow rate", s)),
        }
    }
}

impl MassFlowUnit {
    fn unit(self) -> MassFlowRate {
        match self {
            Self::KilogramPerSecond => KILOGRAM / SECOND,
            Self::KilogramPerMinute => KILOGRAM / MINUTE,
            Self::KilogramPerHour => KILOGRAM / HOUR,
            Self::KilogramPerDay => KILOGRAM / DAY,
            Self::TonnePerHour => TONNE / HOUR,
            Self::TonnePerDay => TONNE / DAY,
            Self::PoundPerHour => POUND / HOUR,
        }
    }

    pub fn quantity(self, value: f64) -> MassFlowRate {
        value * self.unit()
    }

    pub fn value(self, flow_rate: MassFlowRate) -> f64 {
        flow_rate.convert_into(self.unit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use petroflash_core::EosResult;

    #[test]
    fn parse_and_convert() -> EosResult<()> {
        let p = "bara".parse::<PressureUnit>()?.quantity(33.0);
        assert_relative_eq!(p.convert_into(PASCAL), 3.3e6);
        let p = "barg".parse::<PressureUnit>()?.quantity(0.0);
        assert_relative_eq!(p.convert_into(PASCAL), 101325.0);
        assert_relative_eq!(PressureUnit::Psig.value(p), 0.0);

        let t = "C".parse::<TemperatureUnit>()?.quantity(65.0);
        assert_relative_eq!(t.convert_into(KELVIN), 338.15);
        assert_relative_eq!(TemperatureUnit::Fahrenheit.value(t), 149.0, epsilon = 1e-10);

        let m = "kg/hr".parse::<MassFlowUnit>()?.quantity(3600.0);
        assert_relative_eq!(m.convert_into(KILOGRAM / SECOND), 1.0);
        assert_relative_eq!(MassFlowUnit::TonnePerHour.value(m), 3.6);
        Ok(())
    }

    #[test]
    fn unsupported_units() {
        assert!(matches!(
            "furlong".parse::<PressureUnit>(),
            Err(EosError::UnsupportedUnit { .. })
        ));
        assert!(matches!(
            "R".parse::<TemperatureUnit>(),
            Err(EosError::UnsupportedUnit { .. })
        ));
        assert!(matches!(
            "mol/s".parse::<MassFlowUnit>(),
            Err(EosError::UnsupportedUnit { .. })
        ));
    }
}
