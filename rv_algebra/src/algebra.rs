use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::discrete::pmf::{apply_op, combine_pmf, outcome_from_f64, outcome_to_f64, Outcome, Pmf};
use crate::discrete::rv::support_of;
use crate::event::Event;
use crate::quadrature::integrate;
use crate::random_variable::{RandomVariable, Variable};
use crate::{not_implemented, RVError, Result};

const FULL_LINE: (f64, f64) = (f64::NEG_INFINITY, f64::INFINITY);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "^",
        }
    }
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// The right-hand side of an arithmetic operation or comparison.
#[derive(Debug, Clone)]
pub enum Operand {
    Var(Variable),
    Scalar(f64),
}

impl From<Variable> for Operand {
    fn from(value: Variable) -> Self {
        Operand::Var(value)
    }
}

impl From<&Variable> for Operand {
    fn from(value: &Variable) -> Self {
        Operand::Var(value.clone())
    }
}

impl From<f64> for Operand {
    fn from(value: f64) -> Self {
        Operand::Scalar(value)
    }
}

impl From<i32> for Operand {
    fn from(value: i32) -> Self {
        Operand::Scalar(value as f64)
    }
}

impl From<i64> for Operand {
    fn from(value: i64) -> Self {
        Operand::Scalar(value as f64)
    }
}

/// How a derived variable is built from its operands.
///
/// Scalar subtraction and division are stored as `Shift` by `-c` and
/// `Scale` by `1/c`.
#[derive(Debug, Clone)]
enum Combination {
    Shift { base: Variable, offset: f64 },
    Scale { base: Variable, factor: f64 },
    Power { base: Variable, exponent: f64 },
    Reciprocal { base: Variable },
    Pair { left: Variable, op: BinaryOp, right: Variable },
}

/// A random variable derived from others by arithmetic.
///
/// When every operand is discrete the resulting pmf is materialized up
/// front and answers pdf, cdf, median and mode. Expectation and variance
/// always come from the operands' moments.
///
/// Scalar combinations follow the density rules `pdf(z + c)`, `pdf(z * c)`
/// and `pdf(z^c)` whatever the kind of the base variable.
#[derive(Debug)]
pub struct Combined {
    combination: Combination,
    pmf: Option<Pmf>,
}

fn unsupported<T>(what: String) -> Result<T> {
    Err(RVError::UnsupportedOperand(what))
}

impl Combined {
    fn with_scalar(base: &Variable, op: BinaryOp, c: f64) -> Result<Self> {
        if !c.is_finite() {
            return unsupported(format!("{} is not a finite scalar", c));
        }
        if op == BinaryOp::Div && c == 0.0 {
            return Err(RVError::ZeroDivisor);
        }
        let pmf = base.pmf().and_then(|pmf| scalar_pmf(pmf, op, c));
        let base = base.clone();
        let combination = match op {
            BinaryOp::Add => Combination::Shift { base, offset: c },
            BinaryOp::Sub => Combination::Shift { base, offset: -c },
            BinaryOp::Mul => Combination::Scale { base, factor: c },
            BinaryOp::Div => Combination::Scale { base, factor: 1.0 / c },
            BinaryOp::Pow => Combination::Power { base, exponent: c },
        };
        Ok(Self { combination, pmf })
    }

    fn pair(left: &Variable, op: BinaryOp, right: &Variable) -> Result<Self> {
        if op == BinaryOp::Pow {
            return unsupported(String::from("an exponent must be a scalar, not a random variable"));
        }
        let pmf = match (left.pmf(), right.pmf()) {
            (Some(l), Some(r)) => Some(combine_pmf(l, r, op)?),
            (None, Some(r)) if op == BinaryOp::Div && r.mass(&Outcome::from_integer(0)).value() > 0.0 => {
                return Err(RVError::ZeroDivisor);
            },
            _ => None,
        };
        Ok(Self {
            combination: Combination::Pair {
                left: left.clone(),
                op,
                right: right.clone(),
            },
            pmf,
        })
    }

    fn reciprocal(base: &Variable) -> Result<Self> {
        let pmf = match base.pmf() {
            Some(pmf) => Some(combine_pmf(&Pmf::point(Outcome::from_integer(1)), pmf, BinaryOp::Div)?),
            None => None,
        };
        Ok(Self {
            combination: Combination::Reciprocal { base: base.clone() },
            pmf,
        })
    }

    fn integrated_cdf(&self, z: f64) -> Result<f64> {
        let (lo, hi) = self.support();
        if z <= lo {
            return Ok(0.0);
        }
        if z >= hi {
            return Ok(1.0);
        }
        integrate(|t| self.pdf(t), lo, z)
    }
}

/// Mass function of `X op c` under the scalar density rules. The new
/// variable has at `z` the mass `X` has at `z + c` (or `z * c`), so each
/// outcome `k` moves to the `z` solving that equation. Powers, and scalars
/// whose outcomes do not fit an exact key, leave the result without a pmf;
/// its density is then read from `X` directly.
fn scalar_pmf(pmf: &Pmf, op: BinaryOp, c: f64) -> Option<Pmf> {
    let inverse = match op {
        BinaryOp::Add => BinaryOp::Sub,
        BinaryOp::Sub => BinaryOp::Add,
        BinaryOp::Mul => BinaryOp::Div,
        BinaryOp::Div => BinaryOp::Mul,
        BinaryOp::Pow => return None,
    };
    let moved = outcome_from_f64(c).and_then(|c| pmf.map_keys(|k| apply_op(inverse, k, &c)));
    match moved {
        Ok(moved) => Some(moved),
        Err(err) => {
            debug!(op = %op, scalar = c, error = %err, "no exact outcomes for scalar combination");
            None
        },
    }
}

fn product_bounds(x: (f64, f64), y: (f64, f64)) -> (f64, f64) {
    let corners = [x.0 * y.0, x.0 * y.1, x.1 * y.0, x.1 * y.1];
    if corners.iter().any(|c| c.is_nan()) {
        return FULL_LINE;
    }
    (
        corners.iter().copied().fold(f64::INFINITY, f64::min),
        corners.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    )
}

fn pair_support(left: &Variable, op: BinaryOp, right: &Variable) -> (f64, f64) {
    let (lx, hx) = left.support();
    let (ly, hy) = right.support();
    let bounds = match op {
        BinaryOp::Add => (lx + ly, hx + hy),
        BinaryOp::Sub => (lx - hy, hx - ly),
        BinaryOp::Mul => product_bounds((lx, hx), (ly, hy)),
        BinaryOp::Div => {
            if ly <= 0.0 && 0.0 <= hy {
                FULL_LINE
            } else {
                product_bounds((lx, hx), (1.0 / hy, 1.0 / ly))
            }
        },
        BinaryOp::Pow => FULL_LINE,
    };
    if bounds.0.is_nan() || bounds.1.is_nan() {
        FULL_LINE
    } else {
        bounds
    }
}

/// Density of `X op Y` where only `X` is discrete: a finite mixture over
/// the outcomes of `X`.
fn discrete_left_pdf(pmf: &Pmf, op: BinaryOp, right: &Variable, z: f64) -> Result<f64> {
    let mut total = 0.0;
    for (k, p) in pmf.backing_map() {
        let k = outcome_to_f64(k);
        let density = match op {
            BinaryOp::Add => right.pdf(z - k)?,
            BinaryOp::Sub => right.pdf(k - z)?,
            BinaryOp::Mul => {
                if k == 0.0 {
                    continue;
                }
                right.pdf(z / k)? / k.abs()
            },
            BinaryOp::Div => {
                if z == 0.0 {
                    continue;
                }
                right.pdf(k / z)? * k.abs() / (z * z)
            },
            BinaryOp::Pow => return unsupported(String::from("random variable exponent")),
        };
        total += p.value() * density;
    }
    Ok(total)
}

/// Density of `X op Y` where only `Y` is discrete.
fn discrete_right_pdf(left: &Variable, op: BinaryOp, pmf: &Pmf, z: f64) -> Result<f64> {
    let mut total = 0.0;
    for (k, p) in pmf.backing_map() {
        let k = outcome_to_f64(k);
        let density = match op {
            BinaryOp::Add => left.pdf(z - k)?,
            BinaryOp::Sub => left.pdf(z + k)?,
            BinaryOp::Mul => {
                if k == 0.0 {
                    continue;
                }
                left.pdf(z / k)? / k.abs()
            },
            BinaryOp::Div => {
                if k == 0.0 {
                    return Err(RVError::ZeroDivisor);
                }
                left.pdf(z * k)? * k.abs()
            },
            BinaryOp::Pow => return unsupported(String::from("random variable exponent")),
        };
        total += p.value() * density;
    }
    Ok(total)
}

fn integrate_over<F>(f: F, lo: f64, hi: f64) -> Result<f64>
where
    F: Fn(f64) -> Result<f64>,
{
    if lo < hi {
        integrate(f, lo, hi)
    } else {
        Ok(0.0)
    }
}

/// Density of `X op Y` for two continuous variables, integrated over the
/// part of the supports where the integrand can be non-zero.
fn continuous_pdf(left: &Variable, op: BinaryOp, right: &Variable, z: f64) -> Result<f64> {
    let (lx, hx) = left.support();
    let (ly, hy) = right.support();
    match op {
        BinaryOp::Add => integrate_over(
            |x| Ok(left.pdf(x)? * right.pdf(z - x)?),
            lx.max(z - hy),
            hx.min(z - ly),
        ),
        BinaryOp::Sub => integrate_over(
            |x| Ok(left.pdf(x)? * right.pdf(x - z)?),
            lx.max(z + ly),
            hx.min(z + hy),
        ),
        BinaryOp::Mul => {
            // |z / x| must stay inside the support of Y
            let reach = ly.abs().max(hy.abs());
            let cut = if reach.is_finite() && reach > 0.0 { z.abs() / reach } else { 0.0 };
            let integrand = |x: f64| -> Result<f64> { Ok(left.pdf(x)? * right.pdf(z / x)? / x.abs()) };
            let negative = integrate_over(integrand, lx, hx.min(-cut))?;
            let positive = integrate_over(integrand, lx.max(cut), hx)?;
            Ok(negative + positive)
        },
        BinaryOp::Div => {
            // z * y must stay inside the support of X
            let (lo, hi) = if z > 0.0 {
                (lx / z, hx / z)
            } else if z < 0.0 {
                (hx / z, lx / z)
            } else {
                FULL_LINE
            };
            integrate_over(
                |y| Ok(y.abs() * left.pdf(z * y)? * right.pdf(y)?),
                ly.max(lo),
                hy.min(hi),
            )
        },
        BinaryOp::Pow => unsupported(String::from("random variable exponent")),
    }
}

fn pair_pdf(left: &Variable, op: BinaryOp, right: &Variable, z: f64) -> Result<f64> {
    match (left.pmf(), right.pmf()) {
        (Some(pmf), _) => discrete_left_pdf(pmf, op, right, z),
        (None, Some(pmf)) => discrete_right_pdf(left, op, pmf, z),
        (None, None) => continuous_pdf(left, op, right, z),
    }
}

impl RandomVariable for Combined {
    fn pdf(&self, z: f64) -> Result<f64> {
        if let Some(pmf) = &self.pmf {
            return Ok(pmf.mass_at_f64(z).value());
        }
        match &self.combination {
            Combination::Shift { base, offset } => base.pdf(z + offset),
            Combination::Scale { base, factor } => base.pdf(z * factor),
            Combination::Power { base, exponent } => base.pdf(z.powf(*exponent)),
            Combination::Reciprocal { base } => {
                if z == 0.0 {
                    Ok(0.0)
                } else {
                    Ok(base.pdf(1.0 / z)? / (z * z))
                }
            },
            Combination::Pair { left, op, right } => pair_pdf(left, *op, right, z),
        }
    }

    fn cdf(&self, z: f64) -> Result<f64> {
        if let Some(pmf) = &self.pmf {
            return Ok(pmf.cdf(z).value());
        }
        match &self.combination {
            Combination::Shift { base, offset } => base.cdf(z + offset),
            Combination::Scale { base, factor } => base.cdf(z * factor),
            Combination::Power { base, exponent } => base.cdf(z.powf(*exponent)),
            Combination::Reciprocal { .. } => not_implemented("cdf of a reciprocal"),
            Combination::Pair { .. } => self.integrated_cdf(z),
        }
    }

    fn expectation(&self) -> Result<f64> {
        match &self.combination {
            Combination::Shift { base, offset } => Ok(base.expectation()? + offset),
            Combination::Scale { base, factor } => Ok(base.expectation()? * factor),
            Combination::Power { .. } => not_implemented("expectation of a power"),
            Combination::Reciprocal { .. } => not_implemented("expectation of a reciprocal"),
            Combination::Pair { left, op, right } => match op {
                BinaryOp::Add => Ok(left.expectation()? + right.expectation()?),
                BinaryOp::Sub => Ok(left.expectation()? - right.expectation()?),
                BinaryOp::Mul => Ok(left.expectation()? * right.expectation()?),
                BinaryOp::Div => not_implemented("expectation of a quotient"),
                BinaryOp::Pow => not_implemented("expectation of a power"),
            },
        }
    }

    fn variance(&self) -> Result<f64> {
        match &self.combination {
            Combination::Shift { base, .. } => base.variance(),
            Combination::Scale { base, factor } => Ok(base.variance()? * factor * factor),
            Combination::Power { .. } => not_implemented("variance of a power"),
            Combination::Reciprocal { .. } => not_implemented("variance of a reciprocal"),
            Combination::Pair { left, op, right } => match op {
                BinaryOp::Add | BinaryOp::Sub => Ok(left.variance()? + right.variance()?),
                BinaryOp::Mul => {
                    // kept exactly as documented; this is not the variance of
                    // a product of independent variables
                    let (ex, vx) = (left.expectation()?, left.variance()?);
                    let (ey, vy) = (right.expectation()?, right.variance()?);
                    Ok((vx * vx + ex * ex) + (vy * vy + ey * ey) - (ex * ey).powi(2))
                },
                BinaryOp::Div => not_implemented("variance of a quotient"),
                BinaryOp::Pow => not_implemented("variance of a power"),
            },
        }
    }

    fn median(&self) -> Result<f64> {
        match &self.pmf {
            Some(pmf) => pmf.median().map(outcome_to_f64).ok_or(RVError::InvalidBounds),
            None => not_implemented("median of a combination without a mass function"),
        }
    }

    fn mode(&self) -> Result<f64> {
        match &self.pmf {
            Some(pmf) => pmf.mode().map(outcome_to_f64).ok_or(RVError::InvalidBounds),
            None => not_implemented("mode of a combination without a mass function"),
        }
    }

    fn support(&self) -> (f64, f64) {
        if let Some(pmf) = &self.pmf {
            return support_of(pmf);
        }
        match &self.combination {
            Combination::Shift { base, offset } => {
                let (lo, hi) = base.support();
                (lo - offset, hi - offset)
            },
            Combination::Scale { base, factor } => {
                let (lo, hi) = base.support();
                if *factor > 0.0 {
                    (lo / factor, hi / factor)
                } else if *factor < 0.0 {
                    (hi / factor, lo / factor)
                } else {
                    FULL_LINE
                }
            },
            Combination::Power { .. } => FULL_LINE,
            Combination::Reciprocal { base } => {
                let (lo, hi) = base.support();
                if lo <= 0.0 && 0.0 <= hi {
                    FULL_LINE
                } else {
                    (1.0 / hi, 1.0 / lo)
                }
            },
            Combination::Pair { left, op, right } => pair_support(left, *op, right),
        }
    }

    fn point_mass(&self, z: f64) -> Result<f64> {
        if let Some(pmf) = &self.pmf {
            return Ok(pmf.mass_at_f64(z).value());
        }
        match &self.combination {
            Combination::Shift { base, offset } => base.point_mass(z + offset),
            Combination::Scale { base, factor } => base.point_mass(z * factor),
            Combination::Power { base, exponent } => base.point_mass(z.powf(*exponent)),
            Combination::Reciprocal { base } => {
                if z == 0.0 {
                    Ok(0.0)
                } else {
                    base.point_mass(1.0 / z)
                }
            },
            Combination::Pair { .. } => Ok(0.0),
        }
    }

    fn pmf(&self) -> Option<&Pmf> {
        self.pmf.as_ref()
    }
}

impl Variable {
    /// `self op rhs`. The result shares its operands rather than copying them.
    pub fn apply(&self, op: BinaryOp, rhs: impl Into<Operand>) -> Result<Variable> {
        let combined = match rhs.into() {
            Operand::Scalar(c) => Combined::with_scalar(self, op, c)?,
            Operand::Var(other) => Combined::pair(self, op, &other)?,
        };
        Ok(Variable::new(combined))
    }

    pub fn add(&self, rhs: impl Into<Operand>) -> Result<Variable> {
        self.apply(BinaryOp::Add, rhs)
    }

    pub fn subtract(&self, rhs: impl Into<Operand>) -> Result<Variable> {
        self.apply(BinaryOp::Sub, rhs)
    }

    pub fn multiply(&self, rhs: impl Into<Operand>) -> Result<Variable> {
        self.apply(BinaryOp::Mul, rhs)
    }

    pub fn divide(&self, rhs: impl Into<Operand>) -> Result<Variable> {
        self.apply(BinaryOp::Div, rhs)
    }

    /// Only scalar exponents are accepted.
    pub fn power(&self, exponent: impl Into<Operand>) -> Result<Variable> {
        self.apply(BinaryOp::Pow, exponent)
    }

    pub fn reciprocal(&self) -> Result<Variable> {
        Ok(Variable::new(Combined::reciprocal(self)?))
    }

    pub fn negate(&self) -> Result<Variable> {
        self.multiply(-1.0)
    }

    // (P(self < rhs), P(self == rhs))
    fn lt_and_eq(&self, rhs: Operand) -> Result<(f64, f64)> {
        match rhs {
            Operand::Var(other) => {
                let diff = self.subtract(&other)?;
                Ok((diff.cdf(0.0)?, diff.point_mass(0.0)?))
            },
            Operand::Scalar(c) => {
                if !c.is_finite() {
                    return unsupported(format!("cannot compare against {}", c));
                }
                Ok((self.cdf(c)?, self.point_mass(c)?))
            },
        }
    }

    pub fn less_than(&self, rhs: impl Into<Operand>) -> Result<Event> {
        let (lt, _) = self.lt_and_eq(rhs.into())?;
        Event::new(lt)
    }

    pub fn less_equal(&self, rhs: impl Into<Operand>) -> Result<Event> {
        let (lt, eq) = self.lt_and_eq(rhs.into())?;
        Event::new(lt + eq)
    }

    pub fn greater_than(&self, rhs: impl Into<Operand>) -> Result<Event> {
        let (lt, eq) = self.lt_and_eq(rhs.into())?;
        Event::new(1.0 - lt - eq)
    }

    pub fn greater_equal(&self, rhs: impl Into<Operand>) -> Result<Event> {
        let (lt, _) = self.lt_and_eq(rhs.into())?;
        Event::new(1.0 - lt)
    }

    pub fn equal_to(&self, rhs: impl Into<Operand>) -> Result<Event> {
        let (_, eq) = self.lt_and_eq(rhs.into())?;
        Event::new(eq)
    }

    pub fn not_equal(&self, rhs: impl Into<Operand>) -> Result<Event> {
        let (_, eq) = self.lt_and_eq(rhs.into())?;
        Event::new(1.0 - eq)
    }
}

/// `lhs op rhs` with the scalar on the left, rewritten in terms of the
/// operations above.
pub fn reflected_apply(lhs: f64, op: BinaryOp, rhs: &Variable) -> Result<Variable> {
    match op {
        BinaryOp::Add => rhs.add(lhs),
        BinaryOp::Sub => rhs.subtract(lhs)?.negate(),
        BinaryOp::Mul => rhs.multiply(lhs),
        BinaryOp::Div => rhs.divide(lhs)?.reciprocal(),
        BinaryOp::Pow => unsupported(String::from("a random variable cannot be an exponent")),
    }
}

pub fn scalar_add(lhs: f64, rhs: &Variable) -> Result<Variable> {
    reflected_apply(lhs, BinaryOp::Add, rhs)
}

pub fn scalar_subtract(lhs: f64, rhs: &Variable) -> Result<Variable> {
    reflected_apply(lhs, BinaryOp::Sub, rhs)
}

pub fn scalar_multiply(lhs: f64, rhs: &Variable) -> Result<Variable> {
    reflected_apply(lhs, BinaryOp::Mul, rhs)
}

pub fn scalar_divide(lhs: f64, rhs: &Variable) -> Result<Variable> {
    reflected_apply(lhs, BinaryOp::Div, rhs)
}
