use super::Quantity;
use approx::{AbsDiffEq, RelativeEq};
use std::marker::PhantomData;
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};
use typenum::{Diff, Negate, Sum};

impl<U> Clone for Quantity<U> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<U> Copy for Quantity<U> {}

/// Multiplication
impl<U1, U2> Mul<Quantity<U2>> for Quantity<U1>
where
    U1: Add<U2>,
{
    type Output = Quantity<Sum<U1, U2>>;
    fn mul(self, other: Quantity<U2>) -> Self::Output {
        Quantity(self.0 * other.0, PhantomData)
    }
}

impl<U> Mul<Quantity<U>> for f64 {
    type Output = Quantity<U>;
    fn mul(self, other: Quantity<U>) -> Self::Output {
        Quantity(self * other.0, PhantomData)
    }
}

impl<U> Mul<f64> for Quantity<U> {
    type Output = Quantity<U>;
    fn mul(self, other: f64) -> Self::Output {
        Quantity(self.0 * other, PhantomData)
    }
}

impl<U> MulAssign<f64> for Quantity<U> {
    fn mul_assign(&mut self, other: f64) {
        self.0 *= other;
    }
}

/// Division
impl<U1, U2> Div<Quantity<U2>> for Quantity<U1>
where
    U1: Sub<U2>,
{
    type Output = Quantity<Diff<U1, U2>>;
    fn div(self, other: Quantity<U2>) -> Self::Output {
        Quantity(self.0 / other.0, PhantomData)
    }
}

impl<U: Neg> Div<Quantity<U>> for f64 {
    type Output = Quantity<Negate<U>>;
    fn div(self, other: Quantity<U>) -> Self::Output {
        Quantity(self / other.0, PhantomData)
    }
}

impl<U> Div<f64> for Quantity<U> {
    type Output = Quantity<U>;
    fn div(self, other: f64) -> Self::Output {
        Quantity(self.0 / other, PhantomData)
    }
}

/// Addition and subtraction
impl<U> Add for Quantity<U> {
    type Output = Quantity<U>;
    fn add(self, other: Quantity<U>) -> Self::Output {
        Quantity(self.0 + other.0, PhantomData)
    }
}

impl<U> AddAssign for Quantity<U> {
    fn add_assign(&mut self, other: Quantity<U>) {
        self.0 += other.0;
    }
}

impl<U> Sub for Quantity<U> {
    type Output = Quantity<U>;
    fn sub(self, other: Quantity<U>) -> Self::Output {
        Quantity(self.0 - other.0, PhantomData)
    }
}

impl<U> SubAssign for Quantity<U> {
    fn sub_assign(&mut self, other: Quantity<U>) {
        self.0 -= other.0;
    }
}

impl<U> Neg for Quantity<U> {
    type Output = Quantity<U>;
    fn neg(self) -> Self::Output {
        Quantity(-self.0, PhantomData)
    }
}

impl<U> std::iter::Sum for Quantity<U> {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Quantity(iter.map(|q| q.0).sum(), PhantomData)
    }
}

/// Operations for scalars
impl<U> Quantity<U> {
    pub fn abs(self) -> Self {
        Self(self.0.abs(), PhantomData)
    }

    pub fn signum(self) -> f64 {
        self.0.signum()
    }

    pub fn is_sign_negative(&self) -> bool {
        self.0.is_sign_negative()
    }

    pub fn is_sign_positive(&self) -> bool {
        self.0.is_sign_positive()
    }

    pub fn is_finite(&self) -> bool {
        self.0.is_finite()
    }

    pub fn is_nan(&self) -> bool {
        self.0.is_nan()
    }

    pub fn min(self, other: Self) -> Self {
        Self(self.0.min(other.0), PhantomData)
    }

    pub fn max(self, other: Self) -> Self {
        Self(self.0.max(other.0), PhantomData)
    }
}

/// Comparisons
impl<U> PartialEq for Quantity<U> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<U> PartialOrd for Quantity<U> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

impl<U> AbsDiffEq for Quantity<U> {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.0.abs_diff_eq(&other.0, epsilon)
    }
}

impl<U> RelativeEq for Quantity<U> {
    fn default_max_relative() -> Self::Epsilon {
        f64::default_max_relative()
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        self.0.relative_eq(&other.0, epsilon, max_relative)
    }
}
