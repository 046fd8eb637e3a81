use super::*;
use std::fmt;
use typenum::{Integer, N1, N2, N3, P2, P3};

const UNIT_SYMBOLS: [&str; 7] = ["s", "m", "kg", "A", "K", "mol", "cd"];

impl<T, L, M, I, THETA, N, J> fmt::Debug for Quantity<SIUnit<T, L, M, I, THETA, N, J>>
where
    T: Integer,
    L: Integer,
    M: Integer,
    I: Integer,
    THETA: Integer,
    N: Integer,
    J: Integer,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)?;
        let unit = [T::I8, L::I8, M::I8, I::I8, THETA::I8, N::I8, J::I8]
            .iter()
            .zip(UNIT_SYMBOLS.iter())
            .filter_map(|(&u, &s)| match u {
                0 => None,
                1 => Some(s.to_owned()),
                _ => Some(format!("{s}^{u}")),
            })
            .collect::<Vec<String>>()
            .join(" ");
        write!(f, " {}", unit)
    }
}

/// Display in the unit an engineer reads off a process flow sheet.
macro_rules! impl_fmt {
    ($t:ident, $l:ident, $m:ident, $theta:ident, $n:ident, $unit:expr, $symbol:expr) => {
        impl fmt::Display for Quantity<SIUnit<$t, $l, $m, Z0, $theta, $n, Z0>> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let value = self.0 / $unit.0;
                if !((1e-2..1e5).contains(&value.abs()) || value == 0.0) {
                    fmt::LowerExp::fmt(&value, f)?;
                } else {
                    fmt::Display::fmt(&value, f)?;
                }
                write!(f, " {}", $symbol)
            }
        }
    };
}

impl_fmt!(P1, Z0, Z0, Z0, Z0, SECOND, "s");
impl_fmt!(Z0, Z0, P1, Z0, Z0, KILOGRAM, "kg");
impl_fmt!(Z0, Z0, Z0, Z0, P1, MOL, "mol");
impl_fmt!(Z0, Z0, Z0, P1, Z0, KELVIN, "K");
impl_fmt!(N2, N1, P1, Z0, Z0, BAR, "bar");
impl_fmt!(N2, P2, P1, Z0, N1, JOULE / MOL, "J/mol");
impl_fmt!(N2, P2, P1, N1, N1, RGAS, "J/mol/K");
impl_fmt!(Z0, Z0, P1, Z0, N1, GRAM / MOL, "g/mol");
impl_fmt!(Z0, N3, Z0, Z0, P1, MOL / CUBIC_METER, "mol/m³");
impl_fmt!(Z0, N3, P1, Z0, Z0, KILOGRAM / CUBIC_METER, "kg/m³");
impl_fmt!(Z0, P3, Z0, Z0, N1, CUBIC_METER / MOL, "m³/mol");
impl_fmt!(N1, Z0, P1, Z0, Z0, KILOGRAM / HOUR, "kg/h");
impl_fmt!(N1, Z0, Z0, Z0, P1, MOL / SECOND, "mol/s");

#[cfg(test)]
mod tests {
    use crate::si::*;

    #[test]
    fn test_fmt_si() {
        assert_eq!(format!("{:.3}", RGAS), "8.314 J/mol/K");
        assert_eq!(format!("{:.2}", 33.0 * BAR), "33.00 bar");
        assert_eq!(format!("{}", 338.15 * KELVIN), "338.15 K");
    }

    #[test]
    fn test_fmt_exp() {
        assert_eq!(format!("{}", 1e-3 * MOL), "1e-3 mol");
        assert_eq!(format!("{}", 2e6 * MOL / SECOND), "2e6 mol/s");
    }

    #[test]
    fn test_fmt_zero() {
        assert_eq!(format!("{}", 0.0 * KELVIN), "0 K");
        assert_eq!(format!("{:.2}", 0.0 * PASCAL), "0.00 bar");
    }

    #[test]
    fn test_fmt_debug() {
        assert_eq!(format!("{:?}", 2.0 * PASCAL), "2.0 s^-2 m^-1 kg");
    }
}
