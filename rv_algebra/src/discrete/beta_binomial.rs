use statrs::function::beta::ln_beta;
use statrs::function::gamma::ln_gamma;

use crate::counting::n_choose_r;
use crate::discrete::pmf::{Outcome, Pmf};
use crate::discrete::rv::DiscreteRV;
use crate::random_variable::RandomVariable;
use crate::{RVError, Result};

/// Successes in `n` Bernoulli trials whose success probability is itself
/// drawn from a Beta(alpha, beta) distribution.
///
/// With `alpha == beta == 1` this is the discrete uniform distribution on
/// `0..=n`; with `n == 1` it is a Bernoulli trial.
#[derive(PartialEq, Clone, Debug)]
pub struct BetaBinomial {
    n: u64,
    alpha: f64,
    beta: f64,
    rv: DiscreteRV,
}

impl BetaBinomial {
    pub fn new(n: u64, alpha: f64, beta: f64) -> Result<Self> {
        if !(alpha > 0.0 && beta > 0.0) || !alpha.is_finite() || !beta.is_finite() {
            return Err(RVError::InvalidBounds);
        }
        let ln_norm = ln_beta(alpha, beta);
        let mut pairs = Vec::with_capacity(n as usize + 1);
        for k in 0..=n {
            let kf = k as f64;
            let nf = n as f64;
            let ln_ways = match n_choose_r(n, k) {
                Some(ways) => (ways as f64).ln(),
                None => ln_gamma(nf + 1.0) - ln_gamma(kf + 1.0) - ln_gamma(nf - kf + 1.0),
            };
            let p = (ln_ways + ln_beta(kf + alpha, nf - kf + beta) - ln_norm).exp();
            pairs.push((Outcome::from_integer(k as i64), p));
        }
        Ok(Self {
            n,
            alpha,
            beta,
            rv: DiscreteRV::new(Pmf::from_pairs(pairs)?),
        })
    }

    pub fn trials(&self) -> u64 {
        self.n
    }
}

impl RandomVariable for BetaBinomial {
    fn pdf(&self, x: f64) -> Result<f64> {
        self.rv.pdf(x)
    }

    fn cdf(&self, x: f64) -> Result<f64> {
        self.rv.cdf(x)
    }

    fn expectation(&self) -> Result<f64> {
        Ok(self.n as f64 * self.alpha / (self.alpha + self.beta))
    }

    fn variance(&self) -> Result<f64> {
        let n = self.n as f64;
        let s = self.alpha + self.beta;
        Ok(n * self.alpha * self.beta * (s + n) / (s * s * (s + 1.0)))
    }

    fn median(&self) -> Result<f64> {
        self.rv.median()
    }

    fn mode(&self) -> Result<f64> {
        self.rv.mode()
    }

    fn support(&self) -> (f64, f64) {
        (0.0, self.n as f64)
    }

    fn pmf(&self) -> Option<&Pmf> {
        self.rv.pmf()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_uniform_special_case() {
        let bb = BetaBinomial::new(9, 1.0, 1.0).unwrap();
        for k in 0..=9 {
            assert_relative_eq!(0.1, bb.pdf(k as f64).unwrap(), epsilon = 1e-9);
        }
        assert_eq!(Ok(0.0), bb.pdf(10.0));
        assert_relative_eq!(4.5, bb.expectation().unwrap(), epsilon = 1e-12);
        assert_relative_eq!(9.0 * 11.0 / 12.0, bb.variance().unwrap(), epsilon = 1e-12);
    }

    #[test]
    fn test_bernoulli_special_case() {
        let bb = BetaBinomial::new(1, 2.0, 3.0).unwrap();
        assert_relative_eq!(0.6, bb.pdf(0.0).unwrap(), epsilon = 1e-9);
        assert_relative_eq!(0.4, bb.pdf(1.0).unwrap(), epsilon = 1e-9);
        assert_eq!(Ok(0.0), bb.mode());
    }

    #[test]
    fn test_closed_forms_agree_with_pmf() {
        let bb = BetaBinomial::new(12, 2.5, 0.75).unwrap();
        let pmf = bb.pmf().unwrap();
        assert!(pmf.check().is_ok());
        assert_relative_eq!(pmf.expectation(), bb.expectation().unwrap(), epsilon = 1e-8);
        assert_relative_eq!(pmf.variance(), bb.variance().unwrap(), epsilon = 1e-7);
    }

    #[test]
    fn test_bad_parameters() {
        assert_eq!(Err(RVError::InvalidBounds), BetaBinomial::new(3, 0.0, 1.0));
        assert_eq!(Err(RVError::InvalidBounds), BetaBinomial::new(3, 1.0, -2.0));
        assert_eq!(Err(RVError::InvalidBounds), BetaBinomial::new(3, f64::NAN, 1.0));
    }

    #[test]
    fn test_many_trials() {
        let bb = BetaBinomial::new(100, 1.0, 1.0).unwrap();
        assert_eq!(101, bb.pmf().unwrap().len());
        assert_relative_eq!(1.0 / 101.0, bb.pdf(50.0).unwrap(), epsilon = 1e-9);
        assert_eq!(Ok(50.0), bb.median());
    }
}
