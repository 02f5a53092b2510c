use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};
use std::iter::Sum;
use std::ops::{Add, Div, Mul, Neg, Sub};

use num::{One, Zero};
use serde::{Deserialize, Serialize};

/// Relative tolerance used by every `ApproxFloat` equality check.
pub const REL_TOL: f64 = 1e-6;

/// A float whose equality is tolerance based.
///
/// Two values are equal when `|a - b| <= REL_TOL * max(|a|, |b|)`.
/// Ordering stays exact on the wrapped value, so `<` and friends never
/// treat nearby values as equal.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApproxFloat(f64);

impl ApproxFloat {
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

pub fn is_close(a: f64, b: f64) -> bool {
    if a == b {
        return true;
    }
    if !a.is_finite() || !b.is_finite() {
        return false;
    }
    (a - b).abs() <= REL_TOL * f64::max(a.abs(), b.abs())
}

impl PartialEq for ApproxFloat {
    fn eq(&self, other: &Self) -> bool {
        is_close(self.0, other.0)
    }
}

impl PartialEq<f64> for ApproxFloat {
    fn eq(&self, other: &f64) -> bool {
        is_close(self.0, *other)
    }
}

impl PartialEq<ApproxFloat> for f64 {
    fn eq(&self, other: &ApproxFloat) -> bool {
        is_close(*self, other.0)
    }
}

impl PartialOrd for ApproxFloat {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

impl PartialOrd<f64> for ApproxFloat {
    fn partial_cmp(&self, other: &f64) -> Option<Ordering> {
        self.0.partial_cmp(other)
    }
}

impl From<f64> for ApproxFloat {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl From<ApproxFloat> for f64 {
    fn from(value: ApproxFloat) -> Self {
        value.0
    }
}

impl Display for ApproxFloat {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for ApproxFloat {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for ApproxFloat {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Mul for ApproxFloat {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Self(self.0 * rhs.0)
    }
}

impl Div for ApproxFloat {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Self(self.0 / rhs.0)
    }
}

impl Neg for ApproxFloat {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Zero for ApproxFloat {
    fn zero() -> Self {
        Self(0.0)
    }

    // exact, not approximate: callers use this to skip empty entries
    fn is_zero(&self) -> bool {
        self.0 == 0.0
    }
}

impl One for ApproxFloat {
    fn one() -> Self {
        Self(1.0)
    }
}

impl Sum for ApproxFloat {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, x| acc + x)
    }
}

impl<'a> Sum<&'a ApproxFloat> for ApproxFloat {
    fn sum<I: Iterator<Item = &'a ApproxFloat>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, x| acc + *x)
    }
}
