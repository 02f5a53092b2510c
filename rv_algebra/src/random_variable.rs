use std::fmt::Debug;
use std::sync::Arc;

use crate::discrete::pmf::Pmf;
use crate::{not_implemented, Result};

/// The query surface every random variable exposes.
///
/// Every default answers `NotImplemented`. A variable has to provide at least
/// `pdf`, `expectation` and `variance` to take part in arithmetic; the
/// remaining queries are optional and fail loudly when missing.
pub trait RandomVariable: Debug + Send + Sync {
    fn pdf(&self, _x: f64) -> Result<f64> {
        not_implemented("pdf")
    }

    fn cdf(&self, _x: f64) -> Result<f64> {
        not_implemented("cdf")
    }

    fn expectation(&self) -> Result<f64> {
        not_implemented("expectation")
    }

    fn variance(&self) -> Result<f64> {
        not_implemented("variance")
    }

    fn median(&self) -> Result<f64> {
        not_implemented("median")
    }

    fn mode(&self) -> Result<f64> {
        not_implemented("mode")
    }

    /// Closed interval outside of which the pdf vanishes.
    fn support(&self) -> (f64, f64) {
        (f64::NEG_INFINITY, f64::INFINITY)
    }

    /// P(X == x). Zero everywhere for a continuous variable.
    fn point_mass(&self, x: f64) -> Result<f64> {
        match self.pmf() {
            Some(pmf) => Ok(pmf.mass_at_f64(x).value()),
            None => Ok(0.0),
        }
    }

    /// The explicit mass function, for discrete variables only.
    fn pmf(&self) -> Option<&Pmf> {
        None
    }
}

/// Shared, immutable handle to a random variable.
///
/// Cloning a `Variable` clones the handle, never the distribution, so derived
/// variables can keep their operands alive without copying them.
#[derive(Debug, Clone)]
pub struct Variable {
    inner: Arc<dyn RandomVariable>,
}

impl Variable {
    pub fn new<R: RandomVariable + 'static>(rv: R) -> Self {
        Self { inner: Arc::new(rv) }
    }

    pub fn inner(&self) -> &dyn RandomVariable {
        self.inner.as_ref()
    }

    pub fn pdf(&self, x: f64) -> Result<f64> {
        self.inner.pdf(x)
    }

    pub fn cdf(&self, x: f64) -> Result<f64> {
        self.inner.cdf(x)
    }

    pub fn expectation(&self) -> Result<f64> {
        self.inner.expectation()
    }

    pub fn variance(&self) -> Result<f64> {
        self.inner.variance()
    }

    pub fn std_dev(&self) -> Result<f64> {
        Ok(self.variance()?.sqrt())
    }

    pub fn median(&self) -> Result<f64> {
        self.inner.median()
    }

    pub fn mode(&self) -> Result<f64> {
        self.inner.mode()
    }

    pub fn support(&self) -> (f64, f64) {
        self.inner.support()
    }

    pub fn point_mass(&self, x: f64) -> Result<f64> {
        self.inner.point_mass(x)
    }

    pub fn pmf(&self) -> Option<&Pmf> {
        self.inner.pmf()
    }

    pub fn is_discrete(&self) -> bool {
        self.pmf().is_some()
    }
}

impl<R: RandomVariable + 'static> From<R> for Variable {
    fn from(value: R) -> Self {
        Variable::new(value)
    }
}
