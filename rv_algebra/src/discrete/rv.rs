use std::collections::BTreeMap;

use crate::discrete::pmf::{outcome_to_f64, Outcome, Pmf};
use crate::random_variable::RandomVariable;
use crate::{RVError, Result};

/// A random variable given by an explicit probability mass function.
///
/// Every query is answered from the pmf alone. Named distributions wrap a
/// `DiscreteRV` and override the moments with closed forms.
#[derive(PartialEq, Clone, Debug)]
pub struct DiscreteRV {
    pmf: Pmf,
}

impl DiscreteRV {
    pub fn new(pmf: Pmf) -> Self {
        Self { pmf }
    }

    pub fn from_map(m: BTreeMap<Outcome, f64>) -> Result<Self> {
        Ok(Self::new(Pmf::new(m)?))
    }

    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (i64, f64)>,
    {
        let pmf = Pmf::from_pairs(pairs.into_iter().map(|(k, p)| (Outcome::from_integer(k), p)))?;
        Ok(Self::new(pmf))
    }

    pub fn constant(value: i64) -> Self {
        Self::new(Pmf::point(Outcome::from_integer(value)))
    }

    pub fn uniform(lb: i64, ub: i64) -> Result<Self> {
        if ub < lb {
            return Err(RVError::InvalidBounds);
        }
        Ok(Self::new(Pmf::uniform((lb..=ub).map(Outcome::from_integer))?))
    }

    pub fn backing_pmf(&self) -> &Pmf {
        &self.pmf
    }

    pub fn check_pmf(&self) -> Result<()> {
        self.pmf.check()
    }

    pub(crate) fn pmf_mode(&self) -> Result<f64> {
        self.pmf.mode()
            .map(outcome_to_f64)
            .ok_or(RVError::InvalidBounds)
    }

    pub(crate) fn pmf_median(&self) -> Result<f64> {
        self.pmf.median()
            .map(outcome_to_f64)
            .ok_or(RVError::InvalidBounds)
    }

    pub(crate) fn pmf_support(&self) -> (f64, f64) {
        support_of(&self.pmf)
    }
}

pub(crate) fn support_of(pmf: &Pmf) -> (f64, f64) {
    match (pmf.lower_bound(), pmf.upper_bound()) {
        (Some(lb), Some(ub)) => (outcome_to_f64(lb), outcome_to_f64(ub)),
        _ => (f64::NAN, f64::NAN),
    }
}

impl RandomVariable for DiscreteRV {
    fn pdf(&self, x: f64) -> Result<f64> {
        Ok(self.pmf.mass_at_f64(x).value())
    }

    fn cdf(&self, x: f64) -> Result<f64> {
        Ok(self.pmf.cdf(x).value())
    }

    fn expectation(&self) -> Result<f64> {
        Ok(self.pmf.expectation())
    }

    fn variance(&self) -> Result<f64> {
        Ok(self.pmf.variance())
    }

    fn median(&self) -> Result<f64> {
        self.pmf_median()
    }

    fn mode(&self) -> Result<f64> {
        self.pmf_mode()
    }

    fn support(&self) -> (f64, f64) {
        self.pmf_support()
    }

    fn pmf(&self) -> Option<&Pmf> {
        Some(&self.pmf)
    }
}
