use std::fmt::{self, Display, Formatter};

use crate::random_variable::RandomVariable;
use crate::{RVError, Result};

/// The continuous uniform distribution on `[a, b]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Uniform {
    a: f64,
    b: f64,
}

impl Uniform {
    pub fn new(a: f64, b: f64) -> Result<Self> {
        if !(a.is_finite() && b.is_finite() && a < b) {
            return Err(RVError::InvalidBounds);
        }
        Ok(Self { a, b })
    }

    /// Uniform on `[0, 1]`.
    pub fn standard() -> Self {
        Self { a: 0.0, b: 1.0 }
    }

    pub fn lower(&self) -> f64 {
        self.a
    }

    pub fn upper(&self) -> f64 {
        self.b
    }
}

impl Default for Uniform {
    fn default() -> Self {
        Self::standard()
    }
}

impl Display for Uniform {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Uniform(a={}, b={})", self.a, self.b)
    }
}

impl RandomVariable for Uniform {
    fn pdf(&self, x: f64) -> Result<f64> {
        if self.a <= x && x <= self.b {
            Ok(1.0 / (self.b - self.a))
        } else {
            Ok(0.0)
        }
    }

    fn cdf(&self, x: f64) -> Result<f64> {
        if x <= self.a {
            Ok(0.0)
        } else if x >= self.b {
            Ok(1.0)
        } else {
            Ok((x - self.a) / (self.b - self.a))
        }
    }

    fn expectation(&self) -> Result<f64> {
        Ok((self.a + self.b) / 2.0)
    }

    fn variance(&self) -> Result<f64> {
        Ok((self.b - self.a).powi(2) / 12.0)
    }

    fn median(&self) -> Result<f64> {
        Ok((self.a + self.b) / 2.0)
    }

    // every point of the support is a mode; report the left end
    fn mode(&self) -> Result<f64> {
        Ok(self.a)
    }

    fn support(&self) -> (f64, f64) {
        (self.a, self.b)
    }
}
