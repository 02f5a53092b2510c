use std::fmt::{self, Display, Formatter};

use crate::random_variable::RandomVariable;
use crate::{RVError, Result};

/// The Lomax (Pareto type II) distribution: a heavy-tailed Pareto shifted
/// so its support starts at zero.
///
/// `lambda` is the scale and `alpha` the shape. The mean only exists for
/// `alpha > 1` and the variance for `alpha > 2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lomax {
    lambda: f64,
    alpha: f64,
}

impl Lomax {
    pub fn new(lambda: f64, alpha: f64) -> Result<Self> {
        if !(lambda > 0.0 && alpha > 0.0 && lambda.is_finite() && alpha.is_finite()) {
            return Err(RVError::InvalidBounds);
        }
        Ok(Self { lambda, alpha })
    }

    pub fn scale(&self) -> f64 {
        self.lambda
    }

    pub fn shape(&self) -> f64 {
        self.alpha
    }
}

impl Display for Lomax {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Lomax(λ={}, α={})", self.lambda, self.alpha)
    }
}

impl RandomVariable for Lomax {
    fn pdf(&self, x: f64) -> Result<f64> {
        if x < 0.0 {
            return Ok(0.0);
        }
        Ok(self.alpha / self.lambda * (1.0 + x / self.lambda).powf(-(self.alpha + 1.0)))
    }

    fn cdf(&self, x: f64) -> Result<f64> {
        if x <= 0.0 {
            return Ok(0.0);
        }
        Ok(1.0 - (1.0 + x / self.lambda).powf(-self.alpha))
    }

    fn expectation(&self) -> Result<f64> {
        if self.alpha <= 1.0 {
            return Err(RVError::NotImplemented(format!("expectation of {}, which is infinite", self)));
        }
        Ok(self.lambda / (self.alpha - 1.0))
    }

    fn variance(&self) -> Result<f64> {
        if self.alpha <= 2.0 {
            return Err(RVError::NotImplemented(format!("variance of {}, which is not finite", self)));
        }
        let a = self.alpha;
        Ok(self.lambda.powi(2) * a / ((a - 1.0).powi(2) * (a - 2.0)))
    }

    fn median(&self) -> Result<f64> {
        Ok(self.lambda * (2f64.powf(1.0 / self.alpha) - 1.0))
    }

    fn mode(&self) -> Result<f64> {
        Ok(0.0)
    }

    fn support(&self) -> (f64, f64) {
        (0.0, f64::INFINITY)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use crate::quadrature::integrate;

    use super::*;

    #[test]
    fn test_lomax() {
        let l = Lomax::new(2.0, 3.0).unwrap();
        assert_eq!(Ok(1.5), l.pdf(0.0));
        assert_eq!(Ok(0.0), l.pdf(-1.0));
        assert_relative_eq!(1.0 - 0.125, l.cdf(2.0).unwrap(), epsilon = 1e-12);
        assert_eq!(Ok(1.0), l.expectation());
        assert_eq!(Ok(3.0), l.variance());
        assert_eq!(Ok(0.0), l.mode());
        assert_eq!("Lomax(λ=2, α=3)", l.to_string());
    }

    #[test]
    fn test_median_splits_mass() {
        let l = Lomax::new(1.5, 0.7).unwrap();
        assert_relative_eq!(0.5, l.cdf(l.median().unwrap()).unwrap(), epsilon = 1e-12);
    }

    #[test]
    fn test_pdf_integrates_to_cdf() {
        let l = Lomax::new(1.0, 2.5).unwrap();
        let total = integrate(|x| l.pdf(x), 0.0, f64::INFINITY).unwrap();
        assert_relative_eq!(1.0, total, epsilon = 1e-8);
        let partial = integrate(|x| l.pdf(x), 0.0, 3.0).unwrap();
        assert_relative_eq!(l.cdf(3.0).unwrap(), partial, epsilon = 1e-10);
    }

    #[test]
    fn test_heavy_tails() {
        let l = Lomax::new(1.0, 1.0).unwrap();
        assert!(matches!(l.expectation(), Err(RVError::NotImplemented(_))));
        assert!(matches!(l.variance(), Err(RVError::NotImplemented(_))));
        let l = Lomax::new(1.0, 2.0).unwrap();
        assert_eq!(Ok(1.0), l.expectation());
        assert!(matches!(l.variance(), Err(RVError::NotImplemented(_))));
    }

    #[test]
    fn test_bad_parameters() {
        assert_eq!(Err(RVError::InvalidBounds), Lomax::new(0.0, 1.0));
        assert_eq!(Err(RVError::InvalidBounds), Lomax::new(1.0, -1.0));
    }
}
