use tracing::{debug, warn};

use crate::discrete::pmf::{Outcome, Pmf};
use crate::discrete::rv::DiscreteRV;
use crate::random_variable::RandomVariable;
use crate::{RVError, Result};

/// Tail mass left over when the infinite support is cut off.
pub const TAIL_CUTOFF: f64 = 1e-12;
const MAX_OUTCOMES: u64 = 10_000_000;

/// Failures seen before the `r`-th success of independent Bernoulli trials,
/// where `p` is the probability of a failure.
///
/// The support is unbounded, so the pmf is cut off once the remaining tail
/// drops below `TAIL_CUTOFF` and the kept masses are renormalized. The
/// closed-form moments describe the untruncated distribution.
#[derive(PartialEq, Clone, Debug)]
pub struct NegativeBinomial {
    r: u64,
    p: f64,
    rv: DiscreteRV,
}

impl NegativeBinomial {
    pub fn new(r: u64, p: f64) -> Result<Self> {
        if r == 0 || !(0.0..1.0).contains(&p) {
            return Err(RVError::InvalidBounds);
        }
        let rf = r as f64;
        let mut mass = (1.0 - p).powf(rf);
        if mass == 0.0 {
            return Err(RVError::Other(format!("P(X = 0) underflows for r = {}, p = {}", r, p)));
        }
        let mut pairs = Vec::new();
        let mut cumulative = 0.0;
        let mut k: u64 = 0;
        loop {
            pairs.push((k, mass));
            cumulative += mass;
            if 1.0 - cumulative < TAIL_CUTOFF || (mass == 0.0 && k > 0) {
                break;
            }
            if k >= MAX_OUTCOMES {
                warn!(r, p, tail = 1.0 - cumulative, "negative binomial cut off early");
                break;
            }
            mass *= p * (k as f64 + rf) / (k as f64 + 1.0);
            k += 1;
        }
        debug!(r, p, outcomes = pairs.len(), "built negative binomial pmf");
        let pairs = pairs.into_iter()
            .map(|(k, m)| (Outcome::from_integer(k as i64), m / cumulative));
        Ok(Self {
            r,
            p,
            rv: DiscreteRV::new(Pmf::from_pairs(pairs)?),
        })
    }

    pub fn successes(&self) -> u64 {
        self.r
    }

    pub fn failure_probability(&self) -> f64 {
        self.p
    }
}

impl RandomVariable for NegativeBinomial {
    fn pdf(&self, x: f64) -> Result<f64> {
        self.rv.pdf(x)
    }

    fn cdf(&self, x: f64) -> Result<f64> {
        self.rv.cdf(x)
    }

    fn expectation(&self) -> Result<f64> {
        Ok(self.r as f64 * self.p / (1.0 - self.p))
    }

    fn variance(&self) -> Result<f64> {
        Ok(self.r as f64 * self.p / (1.0 - self.p).powi(2))
    }

    fn median(&self) -> Result<f64> {
        self.rv.median()
    }

    fn mode(&self) -> Result<f64> {
        self.rv.mode()
    }

    fn support(&self) -> (f64, f64) {
        (0.0, f64::INFINITY)
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
    fn test_geometric() {
        let nb = NegativeBinomial::new(1, 0.5).unwrap();
        assert_relative_eq!(0.5, nb.pdf(0.0).unwrap(), epsilon = 1e-9);
        assert_relative_eq!(0.25, nb.pdf(1.0).unwrap(), epsilon = 1e-9);
        assert_relative_eq!(0.125, nb.pdf(2.0).unwrap(), epsilon = 1e-9);
        assert_eq!(Ok(1.0), nb.expectation());
        assert_eq!(Ok(2.0), nb.variance());
        assert_eq!(Ok(0.0), nb.mode());
        assert_eq!(Ok(0.0), nb.median());
    }

    #[test]
    fn test_closed_forms_agree_with_pmf() {
        // rolling a 6 is a success, so a failure has probability 5/6
        let nb = NegativeBinomial::new(3, 5.0 / 6.0).unwrap();
        let pmf = nb.pmf().unwrap();
        assert!(pmf.check().is_ok());
        assert_relative_eq!(15.0, nb.expectation().unwrap(), epsilon = 1e-12);
        assert_relative_eq!(pmf.expectation(), nb.expectation().unwrap(), epsilon = 1e-6);
        assert_relative_eq!(pmf.variance(), nb.variance().unwrap(), epsilon = 1e-4);
    }

    #[test]
    fn test_certain_success() {
        let nb = NegativeBinomial::new(4, 0.0).unwrap();
        assert_eq!(1, nb.pmf().unwrap().len());
        assert_eq!(Ok(1.0), nb.pdf(0.0));
        assert_eq!(Ok(0.0), nb.expectation());
    }

    #[test]
    fn test_bad_parameters() {
        assert_eq!(Err(RVError::InvalidBounds), NegativeBinomial::new(0, 0.5));
        assert_eq!(Err(RVError::InvalidBounds), NegativeBinomial::new(2, 1.0));
        assert_eq!(Err(RVError::InvalidBounds), NegativeBinomial::new(2, -0.1));
        assert_eq!(Err(RVError::InvalidBounds), NegativeBinomial::new(2, f64::NAN));
    }
}
