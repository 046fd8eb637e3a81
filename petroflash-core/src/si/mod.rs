//! Scalar physical quantities with compile-time checked units.
//!
//! Values are stored in SI base units. Dimensions are encoded as `typenum`
//! arrays of exponents in the order (time, length, mass, current,
//! temperature, amount, luminous intensity).

#![allow(clippy::type_complexity)]
use num_traits::Zero;
use std::marker::PhantomData;
use std::ops::{Div, Mul};
use typenum::{ATerm, Diff, Negate, Sum, TArr, P1, Z0};

mod fmt;
mod ops;

pub type SIUnit<T, L, M, I, THETA, N, J> =
    TArr<T, TArr<L, TArr<M, TArr<I, TArr<THETA, TArr<N, TArr<J, ATerm>>>>>>>;

/// Physical quantity with compile-time checked unit.
#[repr(transparent)]
pub struct Quantity<U>(f64, PhantomData<U>);

pub type _Dimensionless = SIUnit<Z0, Z0, Z0, Z0, Z0, Z0, Z0>;
pub type _Time = SIUnit<P1, Z0, Z0, Z0, Z0, Z0, Z0>;
pub type _Length = SIUnit<Z0, P1, Z0, Z0, Z0, Z0, Z0>;
pub type _Mass = SIUnit<Z0, Z0, P1, Z0, Z0, Z0, Z0>;
pub type _Temperature = SIUnit<Z0, Z0, Z0, Z0, P1, Z0, Z0>;
pub type _Moles = SIUnit<Z0, Z0, Z0, Z0, Z0, P1, Z0>;

pub type Dimensionless = Quantity<_Dimensionless>;
pub type Time = Quantity<_Time>;
pub type Length = Quantity<_Length>;
pub type Mass = Quantity<_Mass>;
pub type Temperature = Quantity<_Temperature>;
pub type Moles = Quantity<_Moles>;

pub type _Velocity = Diff<_Length, _Time>;
pub type _Acceleration = Diff<_Velocity, _Time>;
pub type _Force = Sum<_Mass, _Acceleration>;
pub type Force = Quantity<_Force>;
pub type _Area = Sum<_Length, _Length>;
pub type _Volume = Sum<_Area, _Length>;
pub type Volume = Quantity<_Volume>;
pub type _Energy = Sum<_Force, _Length>;
pub type Energy = Quantity<_Energy>;
pub type _Pressure = Diff<_Energy, _Volume>;
pub type Pressure = Quantity<_Pressure>;
pub type _Compressibility = Negate<_Pressure>;
pub type Compressibility = Quantity<_Compressibility>;

pub type _Entropy = Diff<_Energy, _Temperature>;
pub type _MolarEntropy = Diff<_Entropy, _Moles>;
pub type MolarEntropy = Quantity<_MolarEntropy>;
pub type _MolarEnergy = Diff<_Energy, _Moles>;
pub type MolarEnergy = Quantity<_MolarEnergy>;
pub type _MolarWeight = Diff<_Mass, _Moles>;
pub type MolarWeight = Quantity<_MolarWeight>;
pub type _Density = Diff<_Moles, _Volume>;
pub type Density = Quantity<_Density>;
pub type _MassDensity = Diff<_Mass, _Volume>;
pub type MassDensity = Quantity<_MassDensity>;
pub type _MolarVolume = Diff<_Volume, _Moles>;
pub type MolarVolume = Quantity<_MolarVolume>;
pub type _MassFlowRate = Diff<_Mass, _Time>;
pub type MassFlowRate = Quantity<_MassFlowRate>;
pub type _MoleFlowRate = Diff<_Moles, _Time>;
pub type MoleFlowRate = Quantity<_MoleFlowRate>;

/// SI base unit second $\\left(\text{s}\\right)$
pub const SECOND: Time = Quantity(1.0, PhantomData);
/// SI base unit meter $\\left(\text{m}\\right)$
pub const METER: Length = Quantity(1.0, PhantomData);
/// SI base unit kilogram $\\left(\text{kg}\\right)$
pub const KILOGRAM: Mass = Quantity(1.0, PhantomData);
/// SI base unit Kelvin $\\left(\text{K}\\right)$
pub const KELVIN: Temperature = Quantity(1.0, PhantomData);
/// SI base unit mol $\\left(\text{mol}\\right)$
pub const MOL: Moles = Quantity(1.0, PhantomData);

/// Derived unit Pascal $\\left(1\\,\text{Pa}=1\\,\\frac{\text{kg}}{\text{m}\\cdot\text{s}^2}\\right)$
pub const PASCAL: Pressure = Quantity(1.0, PhantomData);
/// Derived unit Joule $\\left(1\\,\text{J}=1\\,\text{kg}\\frac{\text{m}^2}{\text{s}^2}\\right)$
pub const JOULE: Energy = Quantity(1.0, PhantomData);
/// Cubic meter $\\left(\text{m}^3\\right)$
pub const CUBIC_METER: Volume = Quantity(1.0, PhantomData);

/// Additional unit bar $\\left(1\\,\text{bar}=10^5\\,\text{Pa}\\right)$
pub const BAR: Pressure = Quantity(1e5, PhantomData);
/// Additional unit standard atmosphere $\\left(1\\,\text{atm}=101325\\,\text{Pa}\\right)$
pub const ATMOSPHERE: Pressure = Quantity(101325.0, PhantomData);
/// Additional unit pound per square inch $\\left(1\\,\text{psi}\\approx 6894.757\\,\text{Pa}\\right)$
pub const PSI: Pressure = Quantity(6894.757293168361, PhantomData);
/// Additional unit gram $\\left(1\\,\text{g}=10^{-3}\\,\text{kg}\\right)$
pub const GRAM: Mass = Quantity(1e-3, PhantomData);
/// Additional unit pound mass $\\left(1\\,\text{lb}=0.45359237\\,\text{kg}\\right)$
pub const POUND: Mass = Quantity(0.45359237, PhantomData);
/// Additional unit metric tonne $\\left(1\\,\text{t}=10^3\\,\text{kg}\\right)$
pub const TONNE: Mass = Quantity(1e3, PhantomData);
/// Additional unit minute $\\left(1\\,\text{min}=60\\,\text{s}\\right)$
pub const MINUTE: Time = Quantity(60.0, PhantomData);
/// Additional unit hour $\\left(1\\,\text{h}=3600\\,\text{s}\\right)$
pub const HOUR: Time = Quantity(3600.0, PhantomData);
/// Additional unit day $\\left(1\\,\text{d}=86400\\,\text{s}\\right)$
pub const DAY: Time = Quantity(86400.0, PhantomData);

/// Ideal gas constant $\\left(R=8.31446261815324\\,\\frac{\text{J}}{\text{molK}}\\right)$
pub const RGAS: MolarEntropy = Quantity(8.31446261815324, PhantomData);

/// Prefix milli $\\left(\text{m}=10^{-3}\\right)$
pub const MILLI: f64 = 1e-3;
/// Prefix kilo $\\left(\text{k}=10^{3}\\right)$
pub const KILO: f64 = 1e3;
/// Prefix mega $\\left(\text{M}=10^{6}\\right)$
pub const MEGA: f64 = 1e6;

/// Additional unit degrees Celsius
pub struct CELSIUS;

impl Mul<CELSIUS> for f64 {
    type Output = Temperature;
    #[allow(clippy::suspicious_arithmetic_impl)]
    fn mul(self, _: CELSIUS) -> Temperature {
        Quantity(self + 273.15, PhantomData)
    }
}

impl Div<CELSIUS> for Temperature {
    type Output = f64;
    #[allow(clippy::suspicious_arithmetic_impl)]
    fn div(self, _: CELSIUS) -> Self::Output {
        self.0 - 273.15
    }
}

/// Additional unit degrees Fahrenheit
pub struct FAHRENHEIT;

impl Mul<FAHRENHEIT> for f64 {
    type Output = Temperature;
    #[allow(clippy::suspicious_arithmetic_impl)]
    fn mul(self, _: FAHRENHEIT) -> Temperature {
        Quantity((self + 459.67) * 5.0 / 9.0, PhantomData)
    }
}

impl Div<FAHRENHEIT> for Temperature {
    type Output = f64;
    #[allow(clippy::suspicious_arithmetic_impl)]
    fn div(self, _: FAHRENHEIT) -> Self::Output {
        self.0 * 9.0 / 5.0 - 459.67
    }
}

impl Dimensionless {
    /// Return the value of a dimensionless quantity.
    pub fn into_value(self) -> f64 {
        self.0
    }
}

impl<U> Quantity<U> {
    /// Convert a quantity into the given unit and return it as a float.
    pub fn convert_into(self, unit: Quantity<U>) -> f64 {
        self.0 / unit.0
    }
}

impl From<f64> for Dimensionless {
    fn from(value: f64) -> Self {
        Quantity(value, PhantomData)
    }
}

impl<U> Zero for Quantity<U> {
    fn zero() -> Self {
        Quantity(0.0, PhantomData)
    }

    fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn derived_units() {
        let p = JOULE / CUBIC_METER;
        assert_relative_eq!(p.convert_into(PASCAL), 1.0);
        let v: MolarVolume = RGAS * 300.0 * KELVIN / (1.0 * BAR);
        assert_relative_eq!(v.convert_into(CUBIC_METER / MOL), 0.0249433878544597);
    }

    #[test]
    fn temperature_scales() {
        assert_relative_eq!((65.0 * CELSIUS).convert_into(KELVIN), 338.15);
        assert_relative_eq!(338.15 * KELVIN / CELSIUS, 65.0, epsilon = 1e-12);
        assert_relative_eq!((32.0 * FAHRENHEIT) / CELSIUS, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn flow_rates() {
        let flow = 10.0 * KILOGRAM / HOUR;
        assert_relative_eq!(flow.convert_into(KILOGRAM / SECOND), 10.0 / 3600.0);
        assert_relative_eq!(flow.convert_into(TONNE / DAY), 0.24, epsilon = 1e-12);
    }
}
